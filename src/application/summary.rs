use crate::domain::models::{Amount, FinancialRecord};
use std::collections::BTreeMap;

/// Dashboard totals over a record collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total: Amount,
    pub income: Amount,
    pub expenses: Amount,
    pub count: usize,
    pub by_category: BTreeMap<String, Amount>,
}

impl Summary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FinancialRecord>,
    {
        let mut summary = Summary::default();
        for record in records {
            summary.count += 1;
            summary.total += record.amount;
            if record.amount.is_expense() {
                summary.expenses += record.amount;
            } else {
                summary.income += record.amount;
            }
            *summary
                .by_category
                .entry(record.category.as_str().to_string())
                .or_default() += record.amount;
        }
        summary
    }
}
