pub mod auth;
pub mod delivery;
pub mod import;
pub mod manual_parts;
pub mod parts;
pub mod realtime;
pub mod reference;
pub mod work_order;
