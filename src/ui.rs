use egui::Context;

use crate::model::{Rgb, SceneGraph};
use crate::view::UiOverlay;

/// Build the debug overlay and apply any color change to the scene
pub fn build_ui(egui_ctx: &Context, raw_input: egui::RawInput, scene: &mut SceneGraph, dt: f32) -> egui::FullOutput {
    let mut color = scene.color_params.material_color.to_array();

    let output = egui_ctx.run(raw_input, |ctx| {
        draw_color_panel(ctx, &mut color);
        draw_debug_window(ctx, scene, dt);
    });

    scene.set_material_color(Rgb::from_array(color));
    output
}

/// Tessellate egui output into something the renderer can draw
pub fn into_overlay(egui_ctx: &Context, output: egui::FullOutput) -> UiOverlay {
    let pixels_per_point = output.pixels_per_point;
    UiOverlay {
        primitives: egui_ctx.tessellate(output.shapes, pixels_per_point),
        textures_delta: output.textures_delta,
        pixels_per_point,
    }
}

fn draw_color_panel(ctx: &Context, color: &mut [u8; 3]) {
    egui::Window::new("Controls")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("materialColor").small());
                ui.color_edit_button_srgb(color);
            });
        });
}

fn draw_debug_window(ctx: &Context, scene: &SceneGraph, dt: f32) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .default_open(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("FPS: {:.0}", if dt > 0.0 { 1.0 / dt } else { 0.0 })).small(),
            );
            let rig = scene.rig.position;
            ui.label(egui::RichText::new(format!("Rig: x: {:.3} y: {:.3}", rig.x, rig.y)).small());
            ui.label(egui::RichText::new(format!("Camera y: {:.2}", scene.camera.local.y)).small());
            ui.label(
                egui::RichText::new(format!("Rotation: {:.2} rad", scene.sections[0].rotation.x)).small(),
            );
        });
}
