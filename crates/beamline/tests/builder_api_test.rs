//! Integration tests for the LatticeBuilder API
//!
//! These tests run whole documents through parsing, assembly and writing.

use float_cmp::assert_approx_eq;

use beamline::{AssemblyError, BeamlineError, LatticeBuilder, Lattice, NodeKind, config::AppConfig};

const SINGLE_QUAD: &str = r#"
<LINAC>
  <MEBT length="1.0">
    <accElement name="Q1" type="QUAD" length="0.2" pos="0.5">
      <parameters field="-15.2"/>
    </accElement>
  </MEBT>
</LINAC>
"#;

const QUAD_WITH_MARKER: &str = r#"
<LINAC>
  <MEBT length="1.0">
    <accElement name="M1" type="MARKER" length="0" pos="0.5"/>
    <accElement name="Q1" type="QUAD" length="0.2" pos="0.5">
      <parameters field="-15.2"/>
    </accElement>
  </MEBT>
</LINAC>
"#;

const OVERLAP: &str = r#"
<LINAC>
  <MEBT length="2.0">
    <accElement name="Q1" type="QUAD" length="0.2" pos="0.5">
      <parameters field="10"/>
    </accElement>
    <accElement name="Q2" type="QUAD" length="0.2" pos="0.69">
      <parameters field="-10"/>
    </accElement>
  </MEBT>
</LINAC>
"#;

const TWO_SEQUENCES: &str = r#"<?xml version="1.0"?>
<SNS_Linac>
  <MEBT length="3.6" bpmFrequency="805000000">
    <accElement name="MEBT:QH01" type="QUAD" length="0.061" pos="0.13">
      <parameters field="-23.5" aprt_type="1" aperture="0.016"/>
    </accElement>
    <accElement name="MEBT:DCH01" type="DCH" length="0" pos="0.13">
      <parameters effLength="0.061" B="0.001"/>
    </accElement>
    <accElement name="MEBT:BPM01" type="BPM" length="0" pos="0.4"/>
    <accElement name="MEBT:QV02" type="QUAD" length="2.4" pos="2.0">
      <parameters field="14.1" poles="2" kls="0.01" skews="0"/>
    </accElement>
    <accElement name="MEBT:M02" type="MARKER" length="0" pos="2.25"/>
  </MEBT>
  <DTL1 length="2.5">
    <Cavities>
      <Cavity name="DTL1:Rg" ampl="1.2" frequency="402500000" pos="1.0"/>
    </Cavities>
    <accElement name="DTL1:Rg02" type="RFGAP" length="0" pos="0.9">
      <parameters E0TL="0.0021" E0L="0.0025" mode="0" phase="-30" EzFile="gap.dat" cavity="DTL1:Rg"/>
      <TTFs beta_min="0.05" beta_max="0.1">
        <polyT order="1" pcoefs="0.6 0.03"/>
        <polyS order="0" pcoefs="0"/>
        <polyTP order="0" pcoefs="0"/>
        <polySP order="0" pcoefs="0"/>
      </TTFs>
    </accElement>
    <accElement name="DTL1:Rg01" type="RFGAP" length="0" pos="0.3">
      <parameters E0TL="0.0021" E0L="0.0025" mode="0" phase="-45" EzFile="gap.dat" cavity="DTL1:Rg"/>
      <TTFs beta_min="0.05" beta_max="0.1">
        <polyT order="1" pcoefs="0.6 0.03"/>
        <polyS order="0" pcoefs="0"/>
        <polyTP order="0" pcoefs="0"/>
        <polySP order="0" pcoefs="0"/>
      </TTFs>
    </accElement>
    <accElement name="DTL1:B1" type="BEND" length="1.3" pos="1.75">
      <parameters theta="0.02" ea1="0.01" ea2="0.01"/>
    </accElement>
  </DTL1>
</SNS_Linac>
"#;

fn node_names(lattice: &Lattice) -> Vec<String> {
    lattice
        .nodes()
        .map(|entry| entry.node().name().to_text())
        .collect()
}

#[test]
fn test_builder_api_exists() {
    let _builder = LatticeBuilder::default();
}

#[test]
fn test_single_quad_gets_drifts() {
    let builder = LatticeBuilder::default();
    let lattice = builder
        .build(SINGLE_QUAD, &["MEBT"])
        .expect("Failed to build lattice");

    assert_eq!(
        node_names(&lattice),
        ["MEBT:START:1:drift", "Q1", "MEBT:Q1:1:drift"]
    );
    let nodes = lattice.sequences()[0].nodes();
    assert_approx_eq!(f64, nodes[0].length(), 0.4);
    assert_approx_eq!(f64, nodes[0].position(), 0.2);
    assert_approx_eq!(f64, nodes[2].length(), 0.4);
    assert_approx_eq!(f64, nodes[2].position(), 0.8);
}

#[test]
fn test_marker_is_embedded_not_standalone() {
    let builder = LatticeBuilder::default();
    let lattice = builder
        .build(QUAD_WITH_MARKER, &["MEBT"])
        .expect("Failed to build lattice");

    assert_eq!(
        node_names(&lattice),
        ["MEBT:START:1:drift", "Q1", "MEBT:Q1:1:drift"]
    );
    let sequence = &lattice.sequences()[0];
    let children: Vec<_> = sequence.children_of(1).collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].node().name(), "M1");
}

#[test]
fn test_overlap_names_both_elements() {
    let builder = LatticeBuilder::default();
    let result = builder.build(OVERLAP, &["MEBT"]);

    match result {
        Err(BeamlineError::Assembly(AssemblyError::Overlap {
            first, second, gap, ..
        })) => {
            assert_eq!(first.name, "Q1");
            assert_eq!(second.name, "Q2");
            assert_approx_eq!(f64, gap, -0.01, epsilon = 1e-9);
        }
        other => panic!("Expected overlap error, got {other:?}"),
    }
}

#[test]
fn test_parse_error_keeps_source() {
    let builder = LatticeBuilder::default();
    let result = builder.parse("<LINAC><MEBT length=\"1\"></LINAC>");

    match result {
        Err(BeamlineError::Parse { src, .. }) => assert!(src.starts_with("<LINAC>")),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_invalid_max_drift_length() {
    let builder = LatticeBuilder::new(AppConfig::default().with_max_drift_length(0.0));
    let result = builder.build(SINGLE_QUAD, &["MEBT"]);
    assert!(matches!(
        result,
        Err(BeamlineError::Assembly(AssemblyError::InvalidMaxDriftLength(_)))
    ));
}

#[test]
fn test_tiny_max_drift_length_fails_cleanly() {
    let builder = LatticeBuilder::new(AppConfig::default().with_max_drift_length(1e-300));
    let result = builder.build("<L><S length=\"1\"></S></L>", &["S"]);
    assert!(matches!(
        result,
        Err(BeamlineError::Assembly(AssemblyError::TooManyDrifts { .. }))
    ));
}

#[test]
fn test_full_lattice() {
    let builder = LatticeBuilder::default();
    let lattice = builder
        .build(TWO_SEQUENCES, &["MEBT", "DTL1"])
        .expect("Failed to build lattice");

    assert_approx_eq!(f64, lattice.length(), 6.1);
    assert_eq!(lattice.sequences()[1].position(), 3.6);
    assert_eq!(lattice.sequences()[0].bpm_frequency(), Some(805e6));

    // The corrector sits at the quad center, the BPM in open space.
    let mebt = lattice.sequence("MEBT").unwrap();
    let quad_index = mebt
        .nodes()
        .iter()
        .position(|node| node.name() == "MEBT:QH01")
        .unwrap();
    let children: Vec<_> = mebt.children_of(quad_index).map(|c| c.node().name()).collect();
    assert_eq!(children, ["MEBT:DCH01"]);

    let bpm = mebt.nodes().iter().find(|node| node.name() == "MEBT:BPM01").unwrap();
    assert_eq!(
        bpm.kind(),
        &NodeKind::Marker {
            alias: Some("BPM".to_string())
        }
    );

    // 0.5 * 2.4 exceeds 1.0, so the quad gets an even number of parts.
    let long_quad = mebt.node("MEBT:QV02").unwrap();
    assert_eq!(long_quad.part_count(), 4);

    let gaps: Vec<_> = lattice.rf_gaps().map(|entry| entry.node().name()).collect();
    assert_eq!(gaps, ["DTL1:Rg01", "DTL1:Rg02"]);
    let cavity = lattice.sequence("DTL1").unwrap().cavity("DTL1:Rg").unwrap();
    assert_approx_eq!(f64, cavity.phase().unwrap(), -45f64.to_radians());

    let gap = lattice.find("DTL1", "DTL1:Rg02").unwrap();
    assert_approx_eq!(f64, gap.global_position(), 4.5);
    assert_eq!(lattice.quads().count(), 2);
}

#[test]
fn test_every_sequence_tiles_its_length() {
    let builder = LatticeBuilder::new(AppConfig::default().with_max_drift_length(0.3));
    let lattice = builder
        .build(TWO_SEQUENCES, &["MEBT", "DTL1"])
        .expect("Failed to build lattice");

    for sequence in lattice.sequences() {
        let mut cursor = 0.0;
        for node in sequence.nodes() {
            assert!((node.extent().start() - cursor).abs() <= 1e-5);
            if node.kind().is_drift() {
                assert!(node.length() <= 0.3 + 1e-12);
            }
            cursor = node.extent().end();
        }
        assert!((cursor - sequence.length()).abs() <= 1e-5);
    }
}

#[test]
fn test_document_round_trip() {
    let builder = LatticeBuilder::default();
    let lattice = builder
        .build(TWO_SEQUENCES, &["MEBT", "DTL1"])
        .expect("Failed to build lattice");

    let text = builder.to_document(&lattice);
    assert!(!text.contains(":drift"), "drifts must not be written");

    let rebuilt = builder
        .build(&text, &["MEBT", "DTL1"])
        .expect("Failed to rebuild lattice");

    let before: Vec<_> = lattice.all_nodes().collect();
    let again: Vec<_> = rebuilt.all_nodes().collect();
    assert_eq!(before.len(), again.len());
    for (a, b) in before.iter().zip(&again) {
        assert_eq!(a.node().name(), b.node().name());
        assert_eq!(a.node().kind(), b.node().kind());
        assert_eq!(a.node().part_count(), b.node().part_count());
        assert!((a.global_position() - b.global_position()).abs() <= 1e-5);
        assert!((a.node().length() - b.node().length()).abs() <= 1e-5);
    }
}

#[test]
fn test_builder_reusability() {
    let builder = LatticeBuilder::default();
    let first = builder.build(SINGLE_QUAD, &["MEBT"]).expect("first build");
    let second = builder.build(SINGLE_QUAD, &["MEBT"]).expect("second build");
    assert_eq!(first, second);
}
