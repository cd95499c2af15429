use beamline_core::descriptor::{ElementKind, ElementParams};
use beamline_parser::{error::ErrorCode, parse, parse_document, write_document};

const DTL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- two-sequence test lattice -->
<SNS_Linac>
  <MEBT length="1.2" bpmFrequency="805000000">
    <accElement name="MEBT_Mag:QH01" type="QUAD" length="0.061" pos="0.1">
      <parameters field="-23.5" aprt_type="1" aperture="0.016"/>
    </accElement>
    <accElement name="MEBT_Diag:BPM01" type="MARKER" length="0.0" pos="0.13"/>
    <accElement name="MEBT_Mag:DCH01" type="DCH" length="0.0" pos="0.1">
      <parameters effLength="0.061"/>
    </accElement>
  </MEBT>
  <DTL1 length="4.15">
    <Cavities>
      <Cavity name="DTL1:Rg" ampl="1.0" frequency="402500000" pos="2.0"/>
    </Cavities>
    <accElement name="DTL1:Rg01" type="RFGAP" length="0" pos="0.05">
      <parameters E0TL="0.0021" E0L="0.0025" mode="0" phase="-41.5" EzFile="dtl1_gap01.dat"
                  cavity="DTL1:Rg" aprt_type="1" aperture="0.0125"/>
      <TTFs beta_min="0.05" beta_max="0.1">
        <polyT order="2" pcoefs="0.6 0.03 -0.001"/>
        <polyS order="1" pcoefs="0.0 0.01"/>
        <polyTP order="1" pcoefs="0.1 0.02"/>
        <polySP order="0" pcoefs="0"/>
      </TTFs>
    </accElement>
    <accElement name="DTL1:BEND" type="BEND" length="0.2" pos="1.0">
      <parameters theta="0.01" ea1="0.005" ea2="0.005" poles="1" kls="0.3" skews="0"/>
    </accElement>
  </DTL1>
</SNS_Linac>
"#;

#[test]
fn test_parse_full_document() {
    let lattice = parse(DTL).expect("Failed to parse");

    assert_eq!(lattice.name, "SNS_Linac");
    let names = lattice.sequence_names();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0], "MEBT");
    assert_eq!(names[1], "DTL1");

    let mebt = &lattice.sequences[0];
    assert_eq!(mebt.bpm_frequency, Some(805e6));
    let kinds: Vec<_> = mebt.elements.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![ElementKind::Quad, ElementKind::Marker, ElementKind::CorrectorH]
    );

    let dtl = &lattice.sequences[1];
    assert_eq!(dtl.cavities.len(), 1);
    match &dtl.elements[0].params {
        ElementParams::RfGap(gap) => {
            assert_eq!(gap.cavity, "DTL1:Rg");
            assert_eq!(gap.ttf.t.coefficients.len(), 3);
        }
        other => panic!("Expected RF gap parameters, got {other:?}"),
    }
}

#[test]
fn test_written_document_reads_back_equal() {
    let lattice = parse(DTL).expect("Failed to parse");
    let text = write_document(&lattice);
    let reread = parse(&text).expect("Failed to re-parse written document");
    assert_eq!(reread, lattice);
}

#[test]
fn test_document_tree_keeps_attribute_spans() {
    let root = parse_document(DTL).expect("Failed to read document");
    let quad = &root.children()[0].children()[0];
    let field = quad.children()[0].attribute("field").unwrap();
    let span = field.span();
    assert_eq!(&DTL[span.start()..span.end()], "-23.5");
}

#[test]
fn test_syntax_errors_stop_before_elaboration() {
    let err = parse("<L><S length=\"x\"></L>").unwrap_err();
    let codes: Vec<_> = err.diagnostics().iter().filter_map(|d| d.code()).collect();
    assert_eq!(codes, vec![ErrorCode::E005]);
}

#[test]
fn test_error_display_mentions_code() {
    let err = parse("<L><S/></L>").unwrap_err();
    assert!(err.to_string().starts_with("error[E100]"));
}

mod proptest_tests {
    use beamline_core::{
        descriptor::{ElementDescriptor, ElementParams, LatticeDescriptor, SequenceDescriptor},
        identifier::Id,
    };
    use beamline_parser::{parse, write_document};
    use proptest::prelude::*;

    fn position_strategy() -> impl Strategy<Value = f64> {
        prop_oneof![
            -1.0e3..1.0e3f64,
            (-1.0e-6..1.0e-6f64),
            any::<f64>().prop_filter("finite", |v| v.is_finite()),
        ]
    }

    fn check_positions_survive_writing(positions: &[f64]) -> Result<(), TestCaseError> {
        let mut sequence = SequenceDescriptor::new(Id::new("S"), 1.0);
        for (i, &position) in positions.iter().enumerate() {
            sequence.elements.push(ElementDescriptor::new(
                Id::new(&format!("M{i}")),
                0.0,
                Some(position),
                ElementParams::Marker,
            ));
        }
        let mut lattice = LatticeDescriptor::new(Id::new("L"));
        lattice.sequences.push(sequence);

        let reread = parse(&write_document(&lattice))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let read_positions: Vec<_> = reread.sequences[0]
            .elements
            .iter()
            .map(|e| e.position)
            .collect();
        let expected: Vec<_> = positions.iter().copied().map(Some).collect();
        prop_assert_eq!(read_positions, expected);
        Ok(())
    }

    proptest! {
        #[test]
        fn positions_survive_writing(positions in prop::collection::vec(position_strategy(), 0..8)) {
            check_positions_survive_writing(&positions)?;
        }
    }
}
