pub mod listing_directory;
pub mod message_service;
pub mod room_list_service;
pub mod room_service;
