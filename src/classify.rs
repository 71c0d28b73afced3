//! Section classification from shallow textual cues
//!
//! Filings announce their statements in running text ("CONSOLIDATED
//! BALANCE SHEETS", "Statements of Operations"), so a fixed, ordered
//! substring rule list is enough to tag sections. First match wins;
//! classification happens once at ingestion time and only on parents.

use crate::chunk::{SectionType, TableName};

/// Outcome of classifying one section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub section_type: SectionType,
    pub table_name: Option<TableName>,
}

impl Classification {
    fn statement(table: TableName) -> Self {
        Self {
            section_type: SectionType::FinancialStatement,
            table_name: Some(table),
        }
    }

    fn plain(section_type: SectionType) -> Self {
        Self {
            section_type,
            table_name: None,
        }
    }
}

/// Classify a section's text. Pure: no state, no external calls.
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();

    if lower.contains("balance sheets") {
        Classification::statement(TableName::BalanceSheet)
    } else if lower.contains("statements of operations") || lower.contains("income statement") {
        Classification::statement(TableName::IncomeStatement)
    } else if lower.contains("cash flows") {
        Classification::statement(TableName::CashFlow)
    } else if lower.contains("risk factors") {
        Classification::plain(SectionType::RiskAnalysis)
    } else {
        Classification::plain(SectionType::GeneralText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_sheet() {
        let c = classify("CONSOLIDATED BALANCE SHEETS\n|Cash|100|");
        assert_eq!(c.section_type, SectionType::FinancialStatement);
        assert_eq!(c.table_name, Some(TableName::BalanceSheet));
    }

    #[test]
    fn test_income_statement_aliases() {
        let a = classify("Consolidated Statements of Operations");
        let b = classify("See the income statement for details");
        assert_eq!(a.table_name, Some(TableName::IncomeStatement));
        assert_eq!(b.table_name, Some(TableName::IncomeStatement));
    }

    #[test]
    fn test_cash_flow() {
        let c = classify("Statements of Cash Flows (In millions)");
        assert_eq!(c.table_name, Some(TableName::CashFlow));
    }

    #[test]
    fn test_risk_factors() {
        let c = classify("Item 1A. Risk Factors");
        assert_eq!(c.section_type, SectionType::RiskAnalysis);
        assert_eq!(c.table_name, None);
    }

    #[test]
    fn test_general_fallback() {
        let c = classify("Management's discussion of seasonal demand.");
        assert_eq!(c.section_type, SectionType::GeneralText);
        assert_eq!(c.table_name, None);
    }

    #[test]
    fn test_rule_precedence() {
        // Rule 1 wins even when a later rule also matches
        let c = classify("Balance Sheets discussion also covering Risk Factors");
        assert_eq!(c.table_name, Some(TableName::BalanceSheet));
    }

    #[test]
    fn test_case_insensitive_and_deterministic() {
        let text = "sTaTeMeNtS oF CaSh FlOwS";
        assert_eq!(classify(text), classify(text));
        assert_eq!(classify(text).table_name, Some(TableName::CashFlow));
    }
}
