pub mod delivery_repo;
pub mod manual_parts_repo;
pub mod part_repo;
pub mod reference_repo;
pub mod staff_repo;
pub mod user_repo;
pub mod work_order_repo;

pub use delivery_repo::DeliveryRepository;
pub use manual_parts_repo::ManualPartsRepository;
pub use part_repo::PartRepository;
pub use reference_repo::ReferenceRepository;
pub use staff_repo::StaffRepository;
pub use user_repo::UserRepository;
pub use work_order_repo::WorkOrderRepository;
