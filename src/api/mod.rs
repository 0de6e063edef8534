pub mod fugle;
