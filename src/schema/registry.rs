use super::ColumnSpec;

pub const BARANGAY_ID: &[ColumnSpec] = &[
    ColumnSpec::primary_key(),
    ColumnSpec::required_text("name", 200),
    ColumnSpec::text("address", 300),
    ColumnSpec::text("registered_voter", 5),
    ColumnSpec::text("nonreg_proof", 300),
    ColumnSpec::date("birthday"),
    ColumnSpec::text("purpose", 300),
    ColumnSpec::text("status", 50),
    ColumnSpec::date("date_issued"),
];

pub const CLEARANCE: &[ColumnSpec] = &[
    ColumnSpec::primary_key(),
    ColumnSpec::required_text("name", 200),
    ColumnSpec::text("address", 300),
    ColumnSpec::date("birthday"),
    ColumnSpec::text("birthplace", 200),
    ColumnSpec::text("gender", 20),
    ColumnSpec::text("civil_status", 50),
    ColumnSpec::text("purpose", 300),
    ColumnSpec::date("date_issued"),
    ColumnSpec::text("status", 50),
];

pub const INDIGENCY: &[ColumnSpec] = &[
    ColumnSpec::primary_key(),
    ColumnSpec::required_text("name", 200),
    ColumnSpec::text("address", 300),
    ColumnSpec::text("purpose", 300),
    ColumnSpec::text("status", 50),
    ColumnSpec::date("date_issued"),
];

pub const GOOD_MORAL: &[ColumnSpec] = &[
    ColumnSpec::primary_key(),
    ColumnSpec::required_text("name", 200),
    ColumnSpec::text("address", 300),
    ColumnSpec::date("date_of_birth"),
    ColumnSpec::text("gender", 20),
    ColumnSpec::text("civil_status", 50),
    ColumnSpec::text("length_of_residency", 50),
    ColumnSpec::text("purpose", 300),
    ColumnSpec::text("status", 50),
    ColumnSpec::date("date_issued"),
];

pub const FIRST_JOB_SEEKER: &[ColumnSpec] = &[
    ColumnSpec::primary_key(),
    ColumnSpec::required_text("name", 200),
    ColumnSpec::text("address", 300),
    ColumnSpec::date("date_of_birth"),
    ColumnSpec::integer("yrs_of_residency"),
    ColumnSpec::date("date_issued"),
];
