pub mod ruin_random;
