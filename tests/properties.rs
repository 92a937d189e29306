use csvtool::{
    codec::{InputConfig, OutputConfig, RowReader, RowWriter},
    columns,
    data::{Cell, Row},
    error::TableError,
    sort::{SortTerm, sort_rows},
};
use proptest::prelude::*;

fn header_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 1..8)
}

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Null),
        "[a-zA-Z0-9 ,\"]{0,8}".prop_filter("sentinel", |s| s != "NULL").prop_map(Cell::text),
    ]
}

proptest! {
    #[test]
    fn positional_specs_address_both_ends(header in header_strategy()) {
        prop_assert_eq!(columns::resolve(&header, "1").unwrap(), 0);
        prop_assert_eq!(columns::resolve(&header, "-1").unwrap(), header.len() - 1);
        prop_assert_eq!(
            columns::resolve(&header, &header.len().to_string()).unwrap(),
            header.len() - 1
        );
        prop_assert!(matches!(
            columns::resolve(&header, "0"),
            Err(TableError::InvalidColumnNumber)
        ));
    }

    #[test]
    fn names_resolve_to_their_first_occurrence(header in header_strategy(), pick in any::<prop::sample::Index>()) {
        let name = &header[pick.index(header.len())];
        let expected = header.iter().position(|candidate| candidate == name).unwrap();
        prop_assert_eq!(columns::resolve(&header, name).unwrap(), expected);
    }

    #[test]
    fn nulls_survive_a_write_read_cycle(rows in prop::collection::vec(prop::collection::vec(cell_strategy(), 3), 1..10)) {
        let output = OutputConfig { null: "NULL".to_string(), ..OutputConfig::default() };
        let mut writer = RowWriter::new(Vec::new(), &output);
        for row in &rows {
            writer.write_row(row).unwrap();
        }
        let bytes = writer.into_inner().unwrap();

        let input = InputConfig { null: Some("NULL".to_string()), ..InputConfig::default() };
        let mut reader = RowReader::new(bytes.as_slice(), &input);
        let decoded = reader.read_all().unwrap();
        prop_assert_eq!(decoded, rows);
    }

    #[test]
    fn sort_is_stable_and_idempotent(keys in prop::collection::vec(0u8..4, 0..40), descending in any::<bool>()) {
        let rows: Vec<Row> = keys
            .iter()
            .enumerate()
            .map(|(pos, key)| vec![Cell::text(key.to_string()), Cell::text(format!("{pos:03}"))])
            .collect();
        let terms = [SortTerm { index: 0, descending, numeric: false }];
        let sorted = sort_rows(rows, &terms).unwrap();

        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a[0] == b[0] {
                prop_assert!(a[1] < b[1], "equal keys kept their input order");
            } else if descending {
                prop_assert!(a[0] > b[0]);
            } else {
                prop_assert!(a[0] < b[0]);
            }
        }
        let again = sort_rows(sorted.clone(), &terms).unwrap();
        prop_assert_eq!(again, sorted);
    }
}
