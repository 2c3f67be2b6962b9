// Value parsers: noisy listing text -> typed fields.
pub mod dates;
pub mod llm;
pub mod location;
pub mod price;
pub mod structured;
