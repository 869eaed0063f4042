pub mod agency;
pub mod invitation;
pub mod notification;
pub mod permission;
pub mod role;
pub mod sidebar_option;
pub mod sub_account;
pub mod subscription;
pub mod user;

pub use agency::Agency;
pub use invitation::{Invitation, InvitationStatus};
pub use notification::Notification;
pub use permission::Permission;
pub use role::{Plan, Role};
pub use sidebar_option::SidebarOption;
pub use sub_account::SubAccount;
pub use subscription::Subscription;
pub use user::User;
