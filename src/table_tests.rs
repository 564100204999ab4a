#[cfg(test)]
mod tests {
    use crate::builder::{BuildError, QueryBuilder};
    use crate::flavor::{Flavor, set_default_flavor_scoped};
    use crate::scan::{ScanError, scan_into};
    use crate::table::{Executor, Facade, FacadeError, Table};
    use crate::value::SqlValue;
    use crate::valuer::{SqlValuer, ValuerError};
    use pretty_assertions::assert_eq;

    crate::fields! {
        enum ExpenseField {
            ExpenseId => "expense_id",
            ExpenseName => "expense_name",
            ExpenseAmount => "ExpenseAmount",
            Note => "note",
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Expense {
        expense_id: i64,
        expense_name: String,
        expense_amount: f64,
        note: Option<String>,
    }

    impl Table for Expense {
        const NAME: &'static str = "expenses";

        type Field = ExpenseField;

        fn all_fields() -> &'static [ExpenseField] {
            ExpenseField::ALL
        }

        fn bind(&mut self, field: ExpenseField, value: SqlValue) -> Result<(), ScanError> {
            match field {
                ExpenseField::ExpenseId => scan_into(&mut self.expense_id, value),
                ExpenseField::ExpenseName => scan_into(&mut self.expense_name, value),
                ExpenseField::ExpenseAmount => scan_into(&mut self.expense_amount, value),
                ExpenseField::Note => scan_into(&mut self.note, value),
            }
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("mock executor failure: {0}")]
    struct MockError(String);

    #[derive(Debug, Default)]
    struct MockExecutor {
        rows: Vec<Vec<SqlValue>>,
        fail: bool,
        calls: Vec<(String, Vec<SqlValue>)>,
    }

    impl MockExecutor {
        fn with_rows(rows: Vec<Vec<SqlValue>>) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }
    }

    impl Executor for MockExecutor {
        type Row = Vec<SqlValue>;
        type Error = MockError;

        fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Self::Row>, MockError> {
            self.calls.push((sql.to_string(), params.to_vec()));
            if self.fail {
                return Err(MockError("connection reset".to_string()));
            }
            Ok(self.rows.clone())
        }
    }

    fn food_row(id: i64, note: Option<&'static str>) -> Vec<SqlValue> {
        vec![
            SqlValue::I64(id),
            "food".into(),
            SqlValue::F64(9.5),
            note.into(),
        ]
    }

    fn pg() -> QueryBuilder<ExpenseField> {
        QueryBuilder::with_dialect(Flavor::PostgreSQL)
    }

    #[test]
    fn init_builders_select_all_columns() {
        let _g = set_default_flavor_scoped(Flavor::PostgreSQL);
        let facade = Facade::<Expense, _>::new(MockExecutor::default());

        let qb = facade.init_builder();
        assert_eq!(
            qb.sql(),
            r#"SELECT expense_id, expense_name, "ExpenseAmount", note FROM expenses"#
        );
        assert_eq!(qb.fields(), Some(ExpenseField::ALL));

        let qb = facade.init_count_builder();
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM expenses");
        assert_eq!(qb.fields(), None);
    }

    #[test]
    fn init_builder_follows_default_flavor() {
        let _g = set_default_flavor_scoped(Flavor::MySQL);
        let facade = Facade::<Expense, _>::new(MockExecutor::default());

        let mut qb = facade.init_builder();
        qb.where_(ExpenseField::ExpenseId).eq(1_i64);
        assert_eq!(
            qb.sql(),
            "SELECT expense_id, expense_name, `ExpenseAmount`, note FROM expenses WHERE expense_id = ?"
        );
    }

    #[test]
    fn get_by_builder_binds_rows() {
        let _g = set_default_flavor_scoped(Flavor::PostgreSQL);
        let mut facade = Facade::<Expense, _>::new(MockExecutor::with_rows(vec![
            food_row(1, None),
            food_row(2, Some("lunch")),
        ]));

        let mut qb = facade.init_builder();
        qb.where_(ExpenseField::ExpenseName)
            .eq("food")
            .order_by(ExpenseField::ExpenseId, [])
            .limit(2);

        let got = facade.get_by_builder(Some(&qb)).unwrap();
        assert_eq!(
            got,
            vec![
                Expense {
                    expense_id: 1,
                    expense_name: "food".to_string(),
                    expense_amount: 9.5,
                    note: None,
                },
                Expense {
                    expense_id: 2,
                    expense_name: "food".to_string(),
                    expense_amount: 9.5,
                    note: Some("lunch".to_string()),
                },
            ]
        );

        let calls = &facade.executor_mut().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            r#"SELECT expense_id, expense_name, "ExpenseAmount", note FROM expenses WHERE expense_name = $1 ORDER BY expense_id LIMIT 2"#
        );
        assert_eq!(calls[0].1, vec![SqlValue::from("food")]);
    }

    #[test]
    fn get_by_builder_binds_only_selected_columns() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::with_rows(vec![vec![
            SqlValue::I64(7),
            "memo".into(),
        ]]));

        let mut qb = pg();
        qb.select([ExpenseField::ExpenseId, ExpenseField::Note])
            .from(Expense::NAME);

        let got = facade.get_by_builder(Some(&qb)).unwrap();
        assert_eq!(
            got,
            vec![Expense {
                expense_id: 7,
                note: Some("memo".to_string()),
                ..Expense::default()
            }]
        );
    }

    #[test]
    fn builder_without_selection_binds_all_columns() {
        let mut facade =
            Facade::<Expense, _>::new(MockExecutor::with_rows(vec![food_row(3, None)]));

        let mut qb = pg();
        qb.from(Expense::NAME);

        let got = facade.get_by_builder(Some(&qb)).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].expense_id, 3);
    }

    #[test]
    fn get_by_builder_iter_hands_each_row_to_callback() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::with_rows(vec![
            food_row(1, None),
            food_row(2, None),
            food_row(3, None),
        ]));
        let mut qb = pg();
        qb.select(ExpenseField::all()).from(Expense::NAME);

        let mut ids = Vec::new();
        facade
            .get_by_builder_iter(Some(&qb), |row: Expense| ids.push(row.expense_id))
            .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn missing_builder_is_rejected() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::default());

        let err = facade
            .get_by_builder::<Flavor>(None)
            .unwrap_err();
        assert!(matches!(err, FacadeError::MissingBuilder));
        assert_eq!(err.to_string(), "builder cannot be absent");

        assert!(matches!(
            facade.count::<Flavor>(None),
            Err(FacadeError::MissingBuilder)
        ));
        assert!(facade.executor_mut().calls.is_empty());
    }

    #[test]
    fn misused_builder_never_reaches_executor() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::default());
        let mut qb = pg();
        qb.select(ExpenseField::all())
            .from(Expense::NAME)
            .where_(ExpenseField::ExpenseId)
            .in_(Vec::<i64>::new());

        let err = facade.get_by_builder(Some(&qb)).unwrap_err();
        assert!(matches!(
            err,
            FacadeError::Build(BuildError::EmptyIn { ref column }) if column == "expense_id"
        ));
        assert!(facade.executor_mut().calls.is_empty());
    }

    #[derive(Debug, Clone)]
    struct Unencodable;

    impl SqlValuer for Unencodable {
        fn value(&self) -> Result<SqlValue, ValuerError> {
            Err(ValuerError("unsupported currency".to_string()))
        }
    }

    #[test]
    fn valuer_failure_is_reported() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::default());
        let mut qb = pg();
        qb.select(ExpenseField::all())
            .from(Expense::NAME)
            .where_(ExpenseField::ExpenseAmount)
            .eq(Box::new(Unencodable) as Box<dyn SqlValuer>);

        let err = facade.get_by_builder(Some(&qb)).unwrap_err();
        assert!(matches!(err, FacadeError::Valuer(_)));
        assert_eq!(
            err.to_string(),
            "builder sql valuer error: unsupported currency"
        );
        assert!(facade.executor_mut().calls.is_empty());
    }

    #[test]
    fn executor_failure_is_wrapped() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor {
            fail: true,
            ..MockExecutor::default()
        });
        let mut qb = pg();
        qb.select(ExpenseField::all()).from(Expense::NAME);

        let err = facade.get_by_builder(Some(&qb)).unwrap_err();
        assert!(matches!(err, FacadeError::Execute(_)));
        assert_eq!(
            err.to_string(),
            "builder query failed: mock executor failure: connection reset"
        );
    }

    #[test]
    fn scan_errors_name_the_column() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::with_rows(vec![vec![
            "not a number".into(),
            "food".into(),
            SqlValue::F64(1.0),
            SqlValue::Null,
        ]]));
        let mut qb = pg();
        qb.select(ExpenseField::all()).from(Expense::NAME);

        let err = facade.get_by_builder(Some(&qb)).unwrap_err();
        match err {
            FacadeError::Scan { field, source } => {
                assert_eq!(field, "expense_id");
                assert_eq!(
                    source,
                    ScanError::TypeMismatch {
                        expected: "i64",
                        found: "string"
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_rows_are_rejected() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::with_rows(vec![vec![
            SqlValue::I64(1),
            "food".into(),
        ]]));
        let mut qb = pg();
        qb.select(ExpenseField::all()).from(Expense::NAME);

        let err = facade.get_by_builder(Some(&qb)).unwrap_err();
        match err {
            FacadeError::Scan { field, source } => {
                assert_eq!(field, "ExpenseAmount");
                assert_eq!(
                    source,
                    ScanError::NotEnoughColumns {
                        expected: 4,
                        got: 2
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn count_reads_first_column_of_first_row() {
        let _g = set_default_flavor_scoped(Flavor::PostgreSQL);
        let mut facade =
            Facade::<Expense, _>::new(MockExecutor::with_rows(vec![vec![SqlValue::I64(42)]]));

        let mut qb = facade.init_count_builder();
        qb.where_(ExpenseField::ExpenseAmount).gr_than(10_i64);

        assert_eq!(facade.count(Some(&qb)).unwrap(), 42);
        assert_eq!(
            facade.executor_mut().calls[0].0,
            r#"SELECT COUNT(*) FROM expenses WHERE "ExpenseAmount" > $1"#
        );
    }

    #[test]
    fn count_without_rows_is_scan_error() {
        let mut facade = Facade::<Expense, _>::new(MockExecutor::default());
        let mut qb = pg();
        qb.select_count([]).from(Expense::NAME);

        assert!(matches!(
            facade.count(Some(&qb)),
            Err(FacadeError::Scan { ref field, .. }) if field == "count"
        ));
    }

    #[test]
    fn borrowed_executor_is_used_in_place() {
        let mut exec = MockExecutor::with_rows(vec![food_row(5, None)]);
        {
            let mut facade = Facade::<Expense, _>::new(&mut exec);
            let mut qb = pg();
            qb.select(ExpenseField::all()).from(Expense::NAME);
            assert_eq!(facade.get_by_builder(Some(&qb)).unwrap().len(), 1);
        }
        assert_eq!(exec.calls.len(), 1);
    }
}
