//! Clip regions inside a full geometry pass

use super::*;
use crate::foundation::math::Vec2;
use crate::render::VertexEffect;
use approx::assert_relative_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Everything above the line `y = x + 1`; only touches the quad's top-left corner
const CORNER_WINDOW: [f32; 6] = [-5.0, -4.0, 5.0, 6.0, -5.0, 6.0];

#[test]
fn test_clip_reduces_quad_to_triangle() {
    let skeleton = skeleton_of(vec![clip(CORNER_WINDOW.to_vec(), Some(1)), region("body", TEXTURE_A)]);
    let mut mesh = mesh();
    let stats = mesh.update_geometry(&skeleton).clone();
    assert_eq!(stats.clip_regions, 1);
    assert_eq!(stats.unterminated_clips, 0);

    let batches = mesh.batches();
    assert_eq!(batches.len(), 1);
    let geometry = batches[0].geometry();
    assert_eq!(geometry.vertex_count(), 3);
    assert_eq!(geometry.indices, vec![0, 1, 2]);

    // Left edge midpoint, top-left corner, top edge midpoint
    let expected_positions = [(-1.0, 0.0), (-1.0, 1.0), (0.0, 1.0)];
    let expected_uvs = [(0.0, 0.5), (0.0, 0.0), (0.5, 0.0)];
    for (vertex, (&(x, y), &(u, v))) in expected_positions.iter().zip(&expected_uvs).enumerate() {
        assert_relative_eq!(geometry.positions[vertex * 3], x, epsilon = 1e-5);
        assert_relative_eq!(geometry.positions[vertex * 3 + 1], y, epsilon = 1e-5);
        assert_relative_eq!(geometry.uvs[vertex * 2], u, epsilon = 1e-5);
        assert_relative_eq!(geometry.uvs[vertex * 2 + 1], v, epsilon = 1e-5);
        assert_eq!(vertex_color(&geometry.colors, vertex), Color::WHITE);
    }
}

#[test]
fn test_vertex_effect_runs_on_clipped_vertices() {
    let mut skeleton = skeleton_of(vec![clip(CORNER_WINDOW.to_vec(), Some(1)), region("body", TEXTURE_A)]);
    skeleton.slots[1].dark_color = Some(Color::new(0.1, 0.2, 0.3, 1.0));

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let effect: Box<dyn VertexEffect + Send> =
        Box::new(move |position: &mut Vec2, _uv: &mut Vec2, light: &mut Color, dark: &mut Color| {
            counter.fetch_add(1, Ordering::Relaxed);
            assert_eq!(*dark, Color::new(0.1, 0.2, 0.3, 1.0));
            assert_eq!(*light, Color::WHITE);
            position.x += 100.0;
            light.r = 0.25;
        });

    let mut mesh = mesh();
    mesh.set_vertex_effect(Some(effect));
    mesh.update_geometry(&skeleton);
    assert_eq!(seen.load(Ordering::Relaxed), 3);

    let geometry = mesh.batches()[0].geometry();
    assert_eq!(geometry.vertex_count(), 3);
    let expected_positions = [(99.0, 0.0), (99.0, 1.0), (100.0, 1.0)];
    for (vertex, &(x, y)) in expected_positions.iter().enumerate() {
        assert_relative_eq!(geometry.positions[vertex * 3], x, epsilon = 1e-4);
        assert_relative_eq!(geometry.positions[vertex * 3 + 1], y, epsilon = 1e-4);
        assert_relative_eq!(vertex_color(&geometry.colors, vertex).r, 0.25);
    }
}

#[test]
fn test_clip_ends_at_marker_slot() {
    // Region 1 is clipped away, region 2 is drawn after the region ended
    let skeleton = skeleton_of(vec![
        clip(vec![10.0, 10.0, 11.0, 10.0, 11.0, 11.0], Some(1)),
        region("hidden", TEXTURE_A),
        region("shown", TEXTURE_A),
    ]);
    let mut mesh = mesh();
    let stats = mesh.update_geometry(&skeleton).clone();
    assert_eq!(stats.skipped_slots, 1);
    assert_eq!(mesh.clip_depth(), 0);

    let geometry = mesh.batches()[0].geometry();
    assert_eq!(geometry.vertex_count(), 4);
    assert_eq!(geometry.indices, vec![0, 1, 2, 2, 3, 0]);
}

#[test]
fn test_fully_clipped_slot_does_not_flush() {
    let skeleton = skeleton_of(vec![
        region("a", TEXTURE_A),
        clip(vec![10.0, 10.0, 11.0, 10.0, 11.0, 11.0], Some(2)),
        region("other texture", TEXTURE_B),
        region("b", TEXTURE_A),
    ]);
    let mut mesh = mesh();
    let stats = mesh.update_geometry(&skeleton).clone();
    assert_eq!(stats.texture_flushes, 0);
    assert_eq!(mesh.batches().len(), 1);
    assert_eq!(mesh.batches()[0].geometry().vertex_count(), 8);
}

#[test]
fn test_unterminated_clip_is_cleared_at_frame_end() {
    let skeleton = skeleton_of(vec![
        clip(vec![-5.0, -5.0, 5.0, -5.0, 5.0, 5.0, -5.0, 5.0], None),
        region("a", TEXTURE_A),
    ]);
    let mut mesh = mesh();
    let stats = mesh.update_geometry(&skeleton).clone();
    assert_eq!(stats.unterminated_clips, 1);
    assert_eq!(mesh.clip_depth(), 0);

    // No clip leaks into the next frame
    let unclipped = skeleton_of(vec![region("a", TEXTURE_A)]);
    let stats = mesh.update_geometry(&unclipped).clone();
    assert_eq!(stats.unterminated_clips, 0);
    assert_eq!(mesh.batches()[0].geometry().vertex_count(), 4);
}

#[test]
fn test_nested_clips_intersect() {
    let skeleton = skeleton_of(vec![
        clip(vec![-5.0, -5.0, 0.0, -5.0, 0.0, 5.0, -5.0, 5.0], Some(3)),
        clip(vec![-5.0, -5.0, 5.0, -5.0, 5.0, 0.0, -5.0, 0.0], Some(2)),
        region("quarter", TEXTURE_A),
        region("half", TEXTURE_B),
    ]);
    let mut mesh = mesh();
    let stats = mesh.update_geometry(&skeleton).clone();
    assert_eq!(stats.clip_regions, 2);
    assert_eq!(mesh.clip_depth(), 0);

    let batches = mesh.batches();
    assert_eq!(batches.len(), 2);

    // Both regions apply to the first slot
    let quarter = batches[0].geometry();
    assert!(quarter.vertex_count() >= 3);
    for position in quarter.positions.chunks_exact(3) {
        assert!(position[0] <= 1e-5 && position[1] <= 1e-5);
    }

    // Only the outer region is left for the second
    let half = batches[1].geometry();
    assert!(half.positions.chunks_exact(3).all(|p| p[0] <= 1e-5));
    assert!(half.positions.chunks_exact(3).any(|p| p[1] > 0.5));
}

#[test]
fn test_degenerate_clip_hides_following_slots() {
    let skeleton = skeleton_of(vec![clip(vec![0.0, 0.0, 1.0, 1.0], None), region("a", TEXTURE_A)]);
    let mut mesh = mesh();
    let stats = mesh.update_geometry(&skeleton).clone();
    assert_eq!(stats.vertex_count, 0);
    assert_eq!(stats.skipped_slots, 1);
}
