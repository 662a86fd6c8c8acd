// Natal chart derivation: zodiac tables, aspect classification, and the
// pipeline that turns a birth moment plus coordinate into a ChartRecord.

pub mod aspects;
pub mod deriver;
pub mod models;
pub mod zodiac;
