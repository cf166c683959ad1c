use glam::Vec2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DrawHandle(pub u32);

/// Draw-side collaborator: rectangles centered on their transform.
pub trait Renderer {
    fn create_rect(&mut self, size: Vec2, fill_color: u32) -> DrawHandle;
    fn set_transform(&mut self, handle: DrawHandle, position: Vec2, rotation: f32);
    /// Called when a surface changes size on resize.
    fn set_size(&mut self, handle: DrawHandle, size: Vec2);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sprite {
    pub size: Vec2,
    pub fill_color: u32,
    pub position: Vec2,
    pub rotation: f32,
}

/// Retained list of rectangles, for hosts that paint it themselves.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    sprites: Vec<Sprite>,
}

impl DrawList {
    pub const STRIDE: usize = 6;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Packed `[x, y, w, h, rotation, color]` per sprite.
    pub fn packed(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.sprites.len() * Self::STRIDE);
        for s in &self.sprites {
            out.extend_from_slice(&[
                s.position.x,
                s.position.y,
                s.size.x,
                s.size.y,
                s.rotation,
                s.fill_color as f32,
            ]);
        }
        out
    }
}

impl Renderer for DrawList {
    fn create_rect(&mut self, size: Vec2, fill_color: u32) -> DrawHandle {
        let handle = DrawHandle(self.sprites.len() as u32);
        self.sprites.push(Sprite {
            size,
            fill_color,
            position: Vec2::ZERO,
            rotation: 0.0,
        });
        handle
    }

    fn set_transform(&mut self, handle: DrawHandle, position: Vec2, rotation: f32) {
        if let Some(s) = self.sprites.get_mut(handle.0 as usize) {
            s.position = position;
            s.rotation = rotation;
        }
    }

    fn set_size(&mut self, handle: DrawHandle, size: Vec2) {
        if let Some(s) = self.sprites.get_mut(handle.0 as usize) {
            s.size = size;
        }
    }
}
