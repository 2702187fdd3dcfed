pub mod alpha_beta_searcher;
pub mod evaluate;
pub mod games;
