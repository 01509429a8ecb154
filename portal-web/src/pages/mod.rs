mod admin;
mod calendar;
mod dashboard;
mod directory;
mod forgot_password;
mod login;
mod not_found;
mod profile;
mod register;
mod settings;
mod unavailable;

pub use admin::AdminPage;
pub use calendar::CalendarView;
pub use dashboard::DashboardPage;
pub use directory::DirectoryView;
pub use forgot_password::ForgotPasswordPage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
pub use profile::ProfilePage;
pub use register::RegisterPage;
pub use settings::SettingsView;
pub use unavailable::UnavailablePage;
