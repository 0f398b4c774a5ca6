/// Shared configuration for terrain reconstruction and road mask generation
pub mod heightfield;
pub mod road_mask;
pub mod texture;
