mod notifications_service;
mod poller_service;
#[cfg(feature = "web")]
mod webserver_service;

pub use notifications_service::NotificationsService;
pub use poller_service::PollerService;
#[cfg(feature = "web")]
pub use webserver_service::WebserverService;
