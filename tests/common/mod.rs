use cubes_engine::engine_state::{
    rendering::{meshing::BlockFaceInstance, InstanceUploader},
    voxels::chunk::ChunkPosition,
};

/// Stands in for the GPU: remembers every chunk it is handed.
#[derive(Default)]
pub struct RecordingUploader {
    pub uploads: Vec<(usize, ChunkPosition, Vec<BlockFaceInstance>)>,
}

impl RecordingUploader {
    pub fn uploaded_slots(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = self.uploads.iter().map(|(slot, _, _)| *slot).collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }
}

impl InstanceUploader for RecordingUploader {
    fn upload_chunk(&mut self, slot: usize, origin: ChunkPosition, faces: &[BlockFaceInstance]) {
        self.uploads.push((slot, origin, faces.to_vec()));
    }
}
