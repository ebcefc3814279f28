//! Business logic services for FertiStock

pub mod notification;
pub mod reporting;
pub mod sales;
pub mod stock;

pub use notification::NotificationService;
pub use reporting::ReportingService;
pub use sales::SalesService;
pub use stock::StockService;
