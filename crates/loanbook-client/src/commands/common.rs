/// Upload column contract shared by the validator and the CLI help text.
/// Order matters: missing-field errors are reported in this order.
pub(crate) const REQUIRED_UPLOAD_FIELDS: [(&str, &str); 15] = [
    ("instrument_id", "string"),
    ("borrower_id", "string"),
    ("asset_class", "string"),
    ("classification_category", "string"),
    ("measurement_basis", "string"),
    ("off_balance_flag", "boolean"),
    ("pd_12m", "number in [0,1]"),
    ("pd_lifetime", "number in [0,1]"),
    ("lgd", "number"),
    ("ead", "number"),
    ("sicr_flag", "boolean"),
    ("eir", "number"),
    ("collateral_flag", "boolean"),
    ("drawdown_date", "date (YYYY-MM-DD)"),
    ("maturity_date", "date (YYYY-MM-DD)"),
];

/// Required only when `collateral_flag` is true.
pub(crate) const COLLATERAL_DETAIL_FIELDS: [&str; 3] =
    ["collateral_type", "collateral_value", "appraisal_date"];
