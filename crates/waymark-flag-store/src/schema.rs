//! Flag store database schema.

/// SQL to create the flags table.
pub const CREATE_TOUR_FLAGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS tour_flags (
    identity    UUID NOT NULL,
    flag_key    VARCHAR(255) NOT NULL,
    value       BOOLEAN NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (identity, flag_key)
);
";
