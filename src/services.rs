pub mod auth;
pub mod catalog_service;
pub mod delivery_service;
pub mod document_service;
pub mod import_service;
pub mod mail;
pub mod manual_parts_service;
pub mod part_service;
pub mod realtime;
pub mod report_service;
pub mod work_order_service;
