//! Form W-2 (Wage and Tax Statement) field rules.

use lazy_static::lazy_static;

use super::patterns::*;
use super::{parse_amount_value, parse_ein_value, parse_name_value, DocumentTypeSpec, FieldRule};

pub const EMPLOYER: &str = "employer";
pub const EIN: &str = "ein";
pub const WAGES: &str = "wages";
pub const FEDERAL_TAX_WITHHELD: &str = "federalTaxWithheld";
pub const SOCIAL_SECURITY_WAGES: &str = "socialSecurityWages";
pub const SOCIAL_SECURITY_TAX_WITHHELD: &str = "socialSecurityTaxWithheld";
pub const MEDICARE_WAGES: &str = "medicareWages";
pub const MEDICARE_TAX_WITHHELD: &str = "medicareTaxWithheld";
pub const SOCIAL_SECURITY_TIPS: &str = "socialSecurityTips";
pub const STATE_WAGES: &str = "stateWages";
pub const STATE_INCOME_TAX: &str = "stateIncomeTax";
pub const EMPLOYEE: &str = "employee";

lazy_static! {
    pub static ref W2_SPEC: DocumentTypeSpec = DocumentTypeSpec::new(
        "W-2",
        vec![
            FieldRule::required(EMPLOYER, &W2_EMPLOYER_NAME, parse_name_value),
            FieldRule::required(EIN, &W2_EIN, parse_ein_value),
            FieldRule::required(WAGES, &W2_WAGES, parse_amount_value),
            FieldRule::required(FEDERAL_TAX_WITHHELD, &W2_FEDERAL_WITHHELD, parse_amount_value),
            FieldRule::optional(SOCIAL_SECURITY_WAGES, &W2_SS_WAGES, parse_amount_value),
            FieldRule::optional(SOCIAL_SECURITY_TAX_WITHHELD, &W2_SS_TAX, parse_amount_value),
            FieldRule::optional(MEDICARE_WAGES, &W2_MEDICARE_WAGES, parse_amount_value),
            FieldRule::optional(MEDICARE_TAX_WITHHELD, &W2_MEDICARE_TAX, parse_amount_value),
            FieldRule::optional(SOCIAL_SECURITY_TIPS, &W2_SS_TIPS, parse_amount_value),
            FieldRule::optional(STATE_WAGES, &W2_STATE_WAGES, parse_amount_value),
            FieldRule::optional(STATE_INCOME_TAX, &W2_STATE_TAX, parse_amount_value),
            FieldRule::optional(EMPLOYEE, &W2_EMPLOYEE_NAME, parse_name_value),
        ],
    );
}
