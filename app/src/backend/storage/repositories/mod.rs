// Repository modules
pub mod animal_type_repository;
pub mod animal_repository;
pub mod sponsor_repository;
pub mod donation_repository;
pub mod health_repository;
pub mod adopter_repository;
pub mod adoption_repository;
pub mod report_repository;

// Re-export repository types
pub use animal_type_repository::AnimalTypeRepository;
pub use animal_repository::AnimalRepository;
pub use sponsor_repository::SponsorRepository;
pub use donation_repository::DonationRepository;
pub use health_repository::HealthRepository;
pub use adopter_repository::AdopterRepository;
pub use adoption_repository::AdoptionRepository;
pub use report_repository::ReportRepository;
