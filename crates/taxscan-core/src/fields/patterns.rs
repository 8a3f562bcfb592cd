//! Label patterns for U.S. tax form field extraction.
//!
//! Every field pattern exposes its value span as the named group `value`.

use lazy_static::lazy_static;
use regex::Regex;

/// Apostrophe as OCR renders it, or dropped.
const APOS: &str = r"['’`]?";

/// Non-digit noise allowed between a label and its amount.
const GAP: &str = r"[^\d]{0,40}?";

/// Dollar amount: with cents, comma-grouped whole dollars, or a bare whole
/// dollar figure of three or more digits closing its line. Box numbers and
/// street numbers never qualify.
const AMOUNT: &str = r"(?P<value>(?:\$[ \t]*)?(?:(?:\d{1,3}(?:[, \u{00a0}]\d{3})+|\d+)\.\d{2,}|\d{1,3}(?:[,\u{00a0}]\d{3})+\b|\d{3,}[ \t]*$))";

/// Nine-digit taxpayer identification number.
const TIN: &str = r"(?P<value>\d{2}[ \t]*-?[ \t]*\d{7})\b";

fn amount_after(label: &str) -> Regex {
    Regex::new(&format!(r"(?im){}{}{}", label, GAP, AMOUNT)).unwrap()
}

fn tin_after(label: &str) -> Regex {
    Regex::new(&format!(r"(?i){}[^\d]{{0,20}}{}", label, TIN)).unwrap()
}

lazy_static! {
    // Form titles
    pub static ref W2_TITLE: Regex = Regex::new(
        r"(?i)\bW-?2\b|wage\s+and\s+tax\s+statement"
    ).unwrap();

    pub static ref F1099_INT_TITLE: Regex = Regex::new(
        r"(?i)\b1099-?INT\b|\binterest\s+income\b"
    ).unwrap();

    /// Label text at the start of a name value, left there when the name
    /// box is blank and the pattern runs into the next label.
    pub static ref FORM_LABEL_START: Regex = Regex::new(&format!(
        r"(?i)^(?:[a-f][ \t]+)?(?:(?:employer|employee|payer|recipient){a}s\b|employer\s+identification|(?:EIN|TIN)\b[\s:#]*(?:\d|$)|control\s+number|omb\s+no\b)|^\d{{1,2}}[a-z]?[ \t]+(?:wages|federal|social\s+security|medicare|state|local|interest|early|investment|foreign|tax)",
        a = APOS
    )).unwrap();

    // W-2 parties
    pub static ref W2_EMPLOYER_NAME: Regex = Regex::new(&format!(
        r"(?i)employer{a}s\s+name(?:,?\s*address,?\s*and\s+zip\s+code)?[\s:]*(?P<value>[^\n]+?)\s*(?:employer{a}s?\s+identification|\bEIN\b|employee{a}s|\n|$)",
        a = APOS
    )).unwrap();

    pub static ref W2_EIN: Regex = tin_after(&format!(
        r"(?:employer{a}s?\s+identification\s+(?:number|no\.?)|\bEIN\b)",
        a = APOS
    ));

    pub static ref W2_EMPLOYEE_NAME: Regex = Regex::new(&format!(
        r"(?i)employee{a}s\s+(?:first\s+)?name(?:\s+and\s+initial)?(?:\s+last\s+name)?[ \t:]*\n?[ \t]*(?P<value>[^\n]+?)[ \t]*(?:\n|$)",
        a = APOS
    )).unwrap();

    // W-2 boxes
    pub static ref W2_WAGES: Regex =
        amount_after(r"wages,?\s+tips,?\s+(?:and\s+)?other\s+comp(?:ensation|\.)?");

    pub static ref W2_FEDERAL_WITHHELD: Regex =
        amount_after(r"federal\s+income\s+tax\s+withheld");

    pub static ref W2_SS_WAGES: Regex =
        amount_after(r"social\s+security\s+wages");

    pub static ref W2_SS_TAX: Regex =
        amount_after(r"social\s+security\s+tax\s+withheld");

    pub static ref W2_MEDICARE_WAGES: Regex =
        amount_after(r"medicare\s+wages(?:\s+and\s+tips)?");

    pub static ref W2_MEDICARE_TAX: Regex =
        amount_after(r"medicare\s+tax\s+withheld");

    pub static ref W2_SS_TIPS: Regex =
        amount_after(r"social\s+security\s+tips");

    pub static ref W2_STATE_WAGES: Regex =
        amount_after(r"state\s+wages,?\s+tips,?\s+etc\.?");

    pub static ref W2_STATE_TAX: Regex =
        amount_after(r"state\s+income\s+tax");

    // 1099-INT parties
    pub static ref F1099_PAYER_NAME: Regex = Regex::new(&format!(
        r"(?i)payer{a}s\s+name(?:,[^\n]*?(?:telephone\s+no\.?|postal\s+code))?[\s:]*(?P<value>[^\n]+?)\s*(?:payer{a}s\s+(?:tin|federal)|recipient{a}s|\n|$)",
        a = APOS
    )).unwrap();

    pub static ref F1099_PAYER_TIN: Regex = tin_after(&format!(
        r"payer{a}s\s+(?:tin|federal\s+identification\s+(?:number|no\.?))",
        a = APOS
    ));

    // 1099-INT boxes
    pub static ref F1099_INTEREST_INCOME: Regex =
        amount_after(r"\binterest\s+income");

    pub static ref F1099_EARLY_WITHDRAWAL: Regex =
        amount_after(r"early\s+withdrawal\s+penalty");

    pub static ref F1099_SAVINGS_BONDS: Regex =
        amount_after(r"interest\s+on\s+u\.?\s*s\.?\s+savings\s+bonds(?:\s+and\s+treas(?:ury|\.)\s+obligations)?");

    pub static ref F1099_FEDERAL_WITHHELD: Regex =
        amount_after(r"federal\s+income\s+tax\s+withheld");

    pub static ref F1099_INVESTMENT_EXPENSES: Regex =
        amount_after(r"investment\s+expenses");

    pub static ref F1099_FOREIGN_TAX: Regex =
        amount_after(r"foreign\s+tax\s+paid");

    pub static ref F1099_TAX_EXEMPT: Regex =
        amount_after(r"tax[-\s]?exempt\s+interest");
}
