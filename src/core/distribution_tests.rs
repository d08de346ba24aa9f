    use super::*;
    use serde_json::json;

    fn ratings(values: &[u8]) -> Vec<Response> {
        values.iter().copied().map(Response::from).collect()
    }

    fn build_default(responses: &[Response]) -> Distribution {
        build_distribution(responses, &FieldMap::default())
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(Category::classify(10.0), Some(Category::Promoter));
        assert_eq!(Category::classify(9.0), Some(Category::Promoter));
        assert_eq!(Category::classify(8.0), Some(Category::Neutral));
        assert_eq!(Category::classify(7.0), Some(Category::Neutral));
        assert_eq!(Category::classify(6.0), Some(Category::Detractor));
        assert_eq!(Category::classify(0.0), Some(Category::Detractor));
    }

    #[test]
    fn test_category_rejects_invalid_ratings() {
        assert_eq!(Category::classify(-1.0), None);
        assert_eq!(Category::classify(11.0), None);
        assert_eq!(Category::classify(8.5), None);
        assert_eq!(Category::classify(f64::NAN), None);
        assert_eq!(Category::classify(f64::INFINITY), None);
    }

    #[test]
    fn test_tally_total_is_sum_of_counts() {
        let tally = Tally::new(4, 10, 6);
        assert_eq!(tally.total(), 20);
        assert_eq!(tally.count(Category::Promoter), 4);
        assert_eq!(tally.count(Category::Detractor), 10);
        assert_eq!(tally.count(Category::Neutral), 6);
    }

    #[test]
    fn test_tally_deserialize_recomputes_total() {
        let tally: Tally =
            serde_json::from_value(json!({"promoters": 8, "detractors": 2, "total": 99})).unwrap();
        assert_eq!(tally.neutrals(), 0);
        assert_eq!(tally.total(), 10);
    }

    #[test]
    fn test_tally_sum() {
        let tallies = [Tally::new(2, 0, 3), Tally::new(1, 4, 3), Tally::new(0, 4, 3)];
        let sum: Tally = tallies.iter().sum();
        assert_eq!(sum, Tally::new(3, 8, 9));
    }

    #[test]
    fn test_raw_ratings_round_trip_tally() {
        let dist = build_default(&ratings(&[
            1, 2, 3, 4, 5, 6, 1, 2, 3, 4, 7, 8, 7, 8, 7, 8, 9, 10, 9, 10,
        ]));

        assert_eq!(dist.tally(), &Tally::new(4, 10, 6));
        let t = dist.tally();
        assert_eq!(t.total(), t.promoters() + t.detractors() + t.neutrals());
        assert_eq!(dist.nps(), Some(-0.3));
    }

    #[test]
    fn test_invalid_ratings_do_not_affect_total() {
        let responses = vec![
            Response::Rating(9.0),
            Response::Rating(-3.0),
            Response::Rating(42.0),
            Response::Ignored,
            Response::Rating(2.0),
        ];
        let mut builder = DistributionBuilder::new(FieldMap::default());
        builder.extend(&responses);

        assert_eq!(builder.tally().total(), 2);
        assert_eq!(builder.skipped(), 3);
        assert_eq!(builder.build().nps(), Some(0.0));
    }

    #[test]
    fn test_single_pre_tallied_object() {
        let responses = Response::from_json(&json!({"promoters": 8, "detractors": 2, "neutrals": 0}));
        let dist = build_default(&responses);

        assert_eq!(dist.total(), 10);
        assert_eq!(dist.nps(), Some(0.6));
    }

    #[test]
    fn test_array_of_distributions() {
        let responses = Response::from_json(&json!([
            {"detractors": 2, "neutrals": 0, "promoters": 3},
            {"detractors": 4, "neutrals": 3, "promoters": 1},
            {"detractors": 4, "neutrals": 3, "promoters": 0}
        ]));

        assert_eq!(build_default(&responses).nps(), Some(-0.3));
    }

    #[test]
    fn test_records_with_rating_field() {
        let responses = Response::from_json(&json!([
            {"nps": 10, "respondent": "a"},
            {"nps": 9},
            {"nps": 0},
            {"nps": "n/a"}
        ]));
        let mut builder = DistributionBuilder::new(FieldMap::default());
        builder.extend(&responses);

        assert_eq!(builder.tally(), Tally::new(2, 1, 0));
        assert_eq!(builder.skipped(), 1);
    }

    #[test]
    fn test_record_counts_and_rating_are_additive() {
        let responses = Response::from_json(&json!({"promoters": 3, "detractors": 1, "nps": 9}));
        let dist = build_default(&responses);

        assert_eq!(dist.tally(), &Tally::new(4, 1, 0));
    }

    #[test]
    fn test_field_map_overrides() {
        let fields = FieldMap::default()
            .with_neutrals("passives")
            .with_nps("score");
        let responses = Response::from_json(&json!([
            {"promoters": 2, "passives": 5, "detractors": 1},
            {"score": 7}
        ]));

        let dist = build_distribution(&responses, &fields);
        assert_eq!(dist.tally(), &Tally::new(2, 1, 6));
    }

    #[test]
    fn test_malformed_counts_treated_as_zero() {
        let responses = Response::from_json(&json!([
            {"promoters": -4, "detractors": 1.5, "neutrals": "seven"},
            {"promoters": 2.0}
        ]));
        let mut builder = DistributionBuilder::new(FieldMap::default());
        builder.extend(&responses);

        assert_eq!(builder.tally(), Tally::new(2, 0, 0));
        assert_eq!(builder.skipped(), 1);
    }

    #[test]
    fn test_unusable_input_yields_undefined_score() {
        for value in [json!(null), json!([]), json!({"key": "value"}), json!("nine")] {
            let dist = build_default(&Response::from_json(&value));
            assert!(dist.tally().is_empty());
            assert_eq!(dist.nps(), None, "input {value} should have no score");
        }
    }

    #[test]
    fn test_mixed_granularity_batch() {
        let mut record = Map::new();
        record.insert("promoters".to_string(), json!(5));
        let responses = vec![
            Response::from(10u8),
            Response::from(Tally::new(0, 3, 1)),
            Response::from(record),
        ];

        assert_eq!(build_default(&responses).tally(), &Tally::new(6, 3, 1));
    }

    #[test]
    fn test_nps_percent() {
        let dist = Tally::new(8, 2, 0).distribution();
        assert_eq!(dist.nps_percent(), Some(60.0));
        assert_eq!(Tally::default().distribution().nps_percent(), None);
    }

    #[test]
    fn test_field_map_validation() {
        assert!(FieldMap::default().validate().is_ok());
        assert!(FieldMap::default().with_promoters("  ").validate().is_err());
    }

    #[test]
    fn test_overflowing_element_is_skipped() {
        let responses = Response::from_json(&json!([
            {"promoters": u64::MAX},
            {"detractors": 1},
            9
        ]));
        let mut builder = DistributionBuilder::new(FieldMap::default());
        builder.extend(&responses);

        assert_eq!(builder.tally(), Tally::new(u64::MAX, 0, 0));
        assert_eq!(builder.skipped(), 2);
    }

    #[test]
    fn test_overflowing_record_is_skipped() {
        let responses = Response::from_json(&json!([
            {"promoters": u64::MAX, "detractors": 1},
            {"promoters": u64::MAX, "nps": 10},
            {"detractors": 2}
        ]));

        let dist = build_default(&responses);
        assert_eq!(dist.tally(), &Tally::new(0, 2, 0));
        assert_eq!(dist.nps(), Some(-1.0));
    }

    #[test]
    fn test_tally_arithmetic_saturates() {
        let big = Tally::new(u64::MAX, 0, 0);
        let sum = big + Tally::new(1, 1, 0);

        assert_eq!(sum.promoters(), u64::MAX);
        assert_eq!(sum.total(), u64::MAX);
        assert_eq!(Tally::new(u64::MAX, 1, 0).total(), u64::MAX);
        assert_eq!(Tally::checked_new(u64::MAX, 1, 0), None);
        assert_eq!(big.checked_add(Tally::new(0, 0, 1)), None);
        assert_eq!(
            Tally::new(1, 2, 3).checked_add(Tally::new(1, 0, 0)),
            Some(Tally::new(2, 2, 3))
        );
    }
