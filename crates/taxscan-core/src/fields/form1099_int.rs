//! Form 1099-INT (Interest Income) field rules.

use lazy_static::lazy_static;

use super::patterns::*;
use super::{parse_amount_value, parse_ein_value, parse_name_value, DocumentTypeSpec, FieldRule};

pub const PAYER: &str = "payer";
pub const AMOUNT: &str = "amount";
pub const PAYER_TIN: &str = "payerTin";
pub const EARLY_WITHDRAWAL_PENALTY: &str = "earlyWithdrawalPenalty";
pub const SAVINGS_BOND_INTEREST: &str = "savingsBondInterest";
pub const FEDERAL_TAX_WITHHELD: &str = "federalTaxWithheld";
pub const INVESTMENT_EXPENSES: &str = "investmentExpenses";
pub const FOREIGN_TAX_PAID: &str = "foreignTaxPaid";
pub const TAX_EXEMPT_INTEREST: &str = "taxExemptInterest";

lazy_static! {
    pub static ref FORM_1099_INT_SPEC: DocumentTypeSpec = DocumentTypeSpec::new(
        "1099-INT",
        vec![
            FieldRule::required(PAYER, &F1099_PAYER_NAME, parse_name_value),
            FieldRule::required(AMOUNT, &F1099_INTEREST_INCOME, parse_amount_value),
            FieldRule::optional(PAYER_TIN, &F1099_PAYER_TIN, parse_ein_value),
            FieldRule::optional(EARLY_WITHDRAWAL_PENALTY, &F1099_EARLY_WITHDRAWAL, parse_amount_value),
            FieldRule::optional(SAVINGS_BOND_INTEREST, &F1099_SAVINGS_BONDS, parse_amount_value),
            FieldRule::optional(FEDERAL_TAX_WITHHELD, &F1099_FEDERAL_WITHHELD, parse_amount_value),
            FieldRule::optional(INVESTMENT_EXPENSES, &F1099_INVESTMENT_EXPENSES, parse_amount_value),
            FieldRule::optional(FOREIGN_TAX_PAID, &F1099_FOREIGN_TAX, parse_amount_value),
            FieldRule::optional(TAX_EXEMPT_INTEREST, &F1099_TAX_EXEMPT, parse_amount_value),
        ],
    );
}
