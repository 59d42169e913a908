use proptest::prelude::*;

use heap_db::{Schema, SchemaRef, Table, Tuple, Value, natural_join};

fn person_schema() -> SchemaRef {
    let mut schema = Schema::new();
    schema
        .add_key_int("id")
        .unwrap()
        .add_varchar("name", 40)
        .unwrap()
        .add_int("score")
        .unwrap();
    schema.into_ref()
}

fn column_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,23}"
}

proptest! {
    #[test]
    fn tuple_round_trips(id in any::<i32>(), name in "\\PC{0,20}", score in any::<i32>()) {
        let schema = person_schema();
        // 20 chars can exceed 40 bytes; only valid tuples are encoded
        prop_assume!(name.len() <= 40);

        let tuple = Tuple::new(&schema, vec![id.into(), name.into(), score.into()]).unwrap();
        let bytes = tuple.serialize().unwrap();
        prop_assert_eq!(Tuple::deserialize(&schema, &bytes).unwrap(), tuple);
    }

    #[test]
    fn schema_round_trips(
        names in proptest::collection::hash_set(column_name(), 1..8),
        widths in proptest::collection::vec(prop::option::of(1usize..200), 8),
        key in any::<prop::sample::Index>(),
    ) {
        let names: Vec<_> = names.into_iter().collect();
        let key = key.index(names.len());

        let mut schema = Schema::new();
        for (idx, (name, width)) in names.iter().zip(&widths).enumerate() {
            match (idx == key, width) {
                (true, Some(width)) => schema.add_key_varchar(name, *width).unwrap(),
                (true, None) => schema.add_key_int(name).unwrap(),
                (false, Some(width)) => schema.add_varchar(name, *width).unwrap(),
                (false, None) => schema.add_int(name).unwrap(),
            };
        }

        let restored = Schema::deserialize(&schema.serialize()).unwrap();
        prop_assert_eq!(restored, schema);
    }

    #[test]
    fn keyed_table_never_holds_duplicate_keys(ids in proptest::collection::vec(0i32..20, 0..50)) {
        let schema = person_schema();
        let mut table = Table::new(&schema);

        for id in &ids {
            let tuple = Tuple::new(&schema, vec![(*id).into(), "x".into(), 0.into()]).unwrap();
            table.insert(tuple).unwrap();
        }

        let mut seen: Vec<_> = table.iter().map(|t| t.get_int(0).unwrap()).collect();
        let inserted = seen.len();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), inserted);

        let mut expected = ids.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(inserted, expected.len());
    }

    #[test]
    fn join_without_shared_columns_is_cartesian(
        left in proptest::collection::vec(any::<i32>(), 0..10),
        right in proptest::collection::vec(any::<i32>(), 0..10),
    ) {
        let mut left_schema = Schema::new();
        left_schema.add_int("a").unwrap();
        let left_schema = left_schema.into_ref();
        let mut right_schema = Schema::new();
        right_schema.add_int("b").unwrap();
        let right_schema = right_schema.into_ref();

        let mut left_table = Table::new(&left_schema);
        for value in &left {
            left_table.insert(Tuple::new(&left_schema, vec![Value::from(*value)]).unwrap()).unwrap();
        }
        let mut right_table = Table::new(&right_schema);
        for value in &right {
            right_table.insert(Tuple::new(&right_schema, vec![Value::from(*value)]).unwrap()).unwrap();
        }

        let joined = natural_join(&left_table, &right_table).unwrap();
        prop_assert_eq!(joined.len(), left.len() * right.len());
        prop_assert!(joined.schema().key().is_none());
    }

    #[test]
    fn join_on_shared_columns_counts_matching_pairs(
        left in proptest::collection::vec(0i32..5, 0..12),
        right in proptest::collection::vec(0i32..5, 0..12),
    ) {
        let mut left_schema = Schema::new();
        left_schema.add_int("k").unwrap().add_int("row").unwrap();
        let left_schema = left_schema.into_ref();
        let mut right_schema = Schema::new();
        right_schema.add_int("k").unwrap();
        let right_schema = right_schema.into_ref();

        let mut left_table = Table::new(&left_schema);
        for (row, k) in left.iter().enumerate() {
            let row = i32::try_from(row).unwrap();
            left_table
                .insert(Tuple::new(&left_schema, vec![(*k).into(), row.into()]).unwrap())
                .unwrap();
        }
        let mut right_table = Table::new(&right_schema);
        for k in &right {
            right_table.insert(Tuple::new(&right_schema, vec![(*k).into()]).unwrap()).unwrap();
        }

        let expected = left
            .iter()
            .map(|l| right.iter().filter(|r| *r == l).count())
            .sum::<usize>();
        let joined = natural_join(&left_table, &right_table).unwrap();
        prop_assert_eq!(joined.len(), expected);
        for tuple in &joined {
            let row = usize::try_from(tuple.get_int(1).unwrap()).unwrap();
            prop_assert_eq!(tuple.get_int(0).unwrap(), left[row]);
        }
    }
}
