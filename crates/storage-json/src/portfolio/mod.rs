mod repository;

pub use repository::JsonPortfolioRepository;
