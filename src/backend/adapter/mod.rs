pub mod email_adapter;
