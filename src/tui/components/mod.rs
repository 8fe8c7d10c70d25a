pub mod input_box;
pub mod login;
pub mod message;
pub mod message_list;
pub mod sidebar;
pub mod title_bar;

pub use input_box::{InputBox, InputEvent};
pub use login::LoginView;
pub use message_list::{MessageList, MessageListState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use title_bar::TitleBar;
