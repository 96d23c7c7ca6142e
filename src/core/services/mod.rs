pub mod expense_parser;
pub mod google_auth;
pub mod ledger;
pub mod notifier;
pub mod transcription;
