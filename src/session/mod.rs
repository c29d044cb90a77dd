pub mod token;

pub use token::user_id_from_token;
