//! Skeleton mesh demo
//!
//! Builds a small hand-posed skeleton (a body quad, a weighted arm mesh and a
//! clipped visor), animates one bone for a few frames and logs the batches
//! each geometry pass produces.
//!
//! Usage: `skeleton_demo [config.toml|config.ron]`

use skeleton_mesh::foundation::logging;
use skeleton_mesh::prelude::*;

const FRAMES: usize = 8;
const BODY_TEXTURE: TextureHandle = TextureHandle(1);
const PROPS_TEXTURE: TextureHandle = TextureHandle(2);

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

fn build_skeleton() -> Skeleton {
    let bones = vec![
        Bone::identity(),
        Bone::from_components(40.0, 20.0, 30.0, 1.0, 1.0),
        Bone::at(0.0, 60.0),
    ];

    let body = RegionAttachment::new("body", Some(BODY_TEXTURE), 0.0, 0.0, 0.0, 80.0, 120.0);

    // Two-bone arm: the hand follows bone 1, the shoulder is shared
    let influence = |bone, x, y, weight| BoneInfluence { bone, x, y, weight };
    let arm = MeshAttachment::new(
        "arm",
        Some(BODY_TEXTURE),
        VertexData::Weighted(vec![
            WeightedVertex { influences: vec![influence(0, 30.0, 10.0, 1.0)] },
            WeightedVertex { influences: vec![influence(0, 30.0, 30.0, 1.0)] },
            WeightedVertex { influences: vec![influence(0, 60.0, 30.0, 0.5), influence(1, 20.0, 10.0, 0.5)] },
            WeightedVertex { influences: vec![influence(1, 20.0, -10.0, 1.0)] },
        ]),
        vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
        vec![0, 1, 2, 2, 3, 0],
    );

    let visor_clip = ClippingAttachment::new(
        "visor clip",
        VertexData::Unweighted(vec![-20.0, -8.0, 20.0, -8.0, 28.0, 0.0, 20.0, 8.0, -20.0, 8.0, -28.0, 0.0]),
        Some(3),
    );
    let visor = RegionAttachment::new("visor", Some(PROPS_TEXTURE), 0.0, 0.0, 15.0, 70.0, 24.0)
        .with_color(Color::new(0.6, 0.8, 1.0, 0.9));

    let slots = vec![
        Slot::new(0, "body", 0).with_attachment(Attachment::Region(body)),
        Slot::new(1, "arm", 1).with_attachment(Attachment::Mesh(arm)),
        Slot::new(2, "visor clip", 2).with_attachment(Attachment::Clipping(visor_clip)),
        Slot::new(3, "visor", 2).with_attachment(Attachment::Region(visor)),
        Slot::new(4, "hitbox", 0).with_attachment(Attachment::Other { name: "hitbox".into() }),
    ];

    Skeleton::new(bones, slots)
}

fn run(config_path: Option<&str>) -> Result<(), DemoError> {
    let mut mesh = match config_path {
        Some(path) => {
            log::info!("Loading mesh configuration from {}", path);
            SkeletonMesh::from_config_file("demo", path)?
        }
        None => SkeletonMesh::new("demo", MeshConfig::default())?,
    };

    let mut swirl = SwirlEffect::new(90.0);
    swirl.angle = 25.0;
    mesh.set_vertex_effect(Some(Box::new(swirl)));

    let mut skeleton = build_skeleton();
    for frame in 0..FRAMES {
        let rotation = frame as f32 * 10.0;
        skeleton.bones[1] = Bone::from_components(40.0, 20.0, 30.0 + rotation, 1.0, 1.0);

        let stats = mesh.update_geometry(&skeleton);
        log::info!(
            "Frame {}: {} batches, {} vertices ({:.1} per batch), {} indices, {} skipped slots",
            frame,
            stats.batch_count,
            stats.vertex_count,
            stats.avg_vertices_per_batch(),
            stats.index_count,
            stats.skipped_slots
        );

        for batch in mesh.batches() {
            log::debug!(
                "  batch {} texture {:?}: {} vertices ({} bytes of indices), alpha index {:.2}",
                batch.id(),
                batch.texture(),
                batch.interleaved().len(),
                batch.index_bytes().len(),
                batch.alpha_index()
            );
        }
    }

    mesh.dispose();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting skeleton mesh demo");

    let config_path = std::env::args().nth(1);
    match run(config_path.as_deref()) {
        Ok(()) => {
            log::info!("Skeleton mesh demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Skeleton mesh demo failed: {}", e);
            Err(e.into())
        }
    }
}
