pub mod order_token;

pub use order_token::{
    generator_for, OrderTokenGenerator, TimestampTokenGenerator, UuidTokenGenerator,
};
