//! # TUI Components
//!
//! Every widget on screen lives here, one file per component.
//!
//! ## Component Architecture
//!
//! Components follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as struct fields:
//! - `NavBar`: "RAG Home", current route path and status
//! - `Message`: one query/response card
//! - `HistoryEntry`: one conversation link in the history panel
//!
//! ### Stateful Components (Event-Driven)
//!
//! A persistent `...State` kept in `TuiState`, wrapped each frame by a
//! transient component that borrows it together with this frame's props:
//! - `InputBox`: editor for the session draft with a Submit affordance
//! - `MessageList`: scrollable exchanges with feedback affordances
//! - `HistoryPanel`: conversation list plus "New chat"
//! - `LandingPage`: welcome page with the "Start Chat" button
//! - `ToastStack`: error notifications in the top-right corner
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props, never by reaching into the
//! core `App`. The loop decides what each component sees:
//!
//! ```rust,ignore
//! NavBar::new(&app.route, &app.status_message, app.is_busy(), spinner_frame)
//!     .render(frame, nav_area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── nav_bar.rs        (top bar)
//! ├── landing.rs        (page at /)
//! ├── history_panel.rs  (sidebar on chat pages)
//! ├── message.rs        (single exchange card)
//! ├── message_list.rs   (scrollable exchange container)
//! ├── input_box/        (draft editor)
//! └── toast.rs          (notification overlay)
//! ```

pub mod history_panel;
pub mod input_box;
pub mod landing;
pub mod message;
pub mod message_list;
pub mod nav_bar;
pub mod toast;

pub use history_panel::{HistoryEvent, HistoryPanel, HistoryPanelState};
pub use input_box::{InputBox, InputBoxState, InputEvent};
pub use landing::{LandingEvent, LandingPage, LandingState};
pub use message_list::{MessageList, MessageListEvent, MessageListState};
pub use nav_bar::NavBar;
pub use toast::{ToastStack, ToastState};
