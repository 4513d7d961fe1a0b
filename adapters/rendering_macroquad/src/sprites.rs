use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use gridcaster_core::Rgb;
use gridcaster_rendering::{pack_rgb, Sprite};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const ALL_SPRITE_KEYS: [SpriteKey; 1] = [SpriteKey::Weapon];

/// Sprites the game knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Weapon overlay drawn at the bottom of the view.
    Weapon,
}

impl SpriteKey {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "weapon" => Ok(Self::Weapon),
            _ => bail!("unknown sprite key `{name}`"),
        }
    }
}

/// Decoded sprites listed by a manifest.
#[derive(Debug)]
pub struct SpriteSheet {
    sprites: HashMap<SpriteKey, Sprite>,
}

impl SpriteSheet {
    /// Loads and decodes every sprite listed by the manifest at `path`.
    ///
    /// Sprite paths are resolved relative to the manifest's directory.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, load_sprite_file)
    }

    /// Borrows the sprite registered under `key`.
    #[must_use]
    pub fn get(&self, key: SpriteKey) -> Option<&Sprite> {
        self.sprites.get(&key)
    }

    /// Removes and returns the sprite registered under `key`.
    pub fn take(&mut self, key: SpriteKey) -> Option<Sprite> {
        self.sprites.remove(&key)
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Sprite>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Sprite>,
    ) -> Result<Self> {
        let mut sprites = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let sprite = loader(key, &path).with_context(|| {
                format!("failed to load sprite {key:?} from {}", path.display())
            })?;
            log::debug!(
                "loaded sprite {key:?} ({}x{}) from {}",
                sprite.width(),
                sprite.height(),
                path.display()
            );
            if sprites.insert(key, sprite).is_some() {
                bail!("duplicate sprite entry for {key:?}");
            }
        }
        Ok(Self { sprites })
    }
}

fn load_sprite_file(_key: SpriteKey, path: &Path) -> Result<Sprite> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    decode_sprite(&bytes)
}

/// Decodes an encoded image into a sprite; fully transparent pixels become `0`.
pub fn decode_sprite(bytes: &[u8]) -> Result<Sprite> {
    let image = image::load_from_memory(bytes)
        .context("failed to decode sprite image")?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let pixels = image
        .pixels()
        .map(|pixel| {
            let [red, green, blue, alpha] = pixel.0;
            if alpha == 0 {
                0
            } else {
                pack_rgb(Rgb::from_rgb(red, green, blue))
            }
        })
        .collect();
    Ok(Sprite::new(width, height, pixels)?)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key = SpriteKey::parse(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        let _ = resolved.insert(key, base_path.join(relative_path));
    }

    let mut ordered = Vec::with_capacity(ALL_SPRITE_KEYS.len());
    for key in ALL_SPRITE_KEYS {
        let Some(path) = resolved.remove(&key) else {
            bail!("sprite manifest missing entry for {key:?}");
        };
        ordered.push((key, path));
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png(width: u32, height: u32, rgba: Vec<u8>) -> Vec<u8> {
        let buffer = image::RgbaImage::from_raw(width, height, rgba).expect("matching length");
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .expect("png encoding");
        bytes
    }

    #[test]
    fn manifest_requires_weapon_entry() {
        let manifest = r#"
            version = 1

            [sprites]
        "#;

        assert!(parse_manifest(manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_rejects_unknown_keys() {
        let manifest = r#"
            version = 1

            [sprites]
            weapon = "gun.png"
            crosshair = "cross.png"
        "#;

        assert!(parse_manifest(manifest, Path::new("assets")).is_err());
    }

    #[test]
    fn manifest_rejects_other_versions() {
        let manifest = r#"
            version = 2

            [sprites]
            weapon = "gun.png"
        "#;

        let error = parse_manifest(manifest, Path::new("assets")).expect_err("version 2");
        assert!(error.to_string().contains("unsupported sprite manifest version"));
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let manifest = r#"
            version = 1

            [sprites]
            weapon = "overlay/gun.png"
        "#;

        let parsed = parse_manifest(manifest, Path::new("root")).expect("manifest should parse");

        assert_eq!(
            parsed,
            vec![(SpriteKey::Weapon, PathBuf::from("root/overlay/gun.png"))]
        );
    }

    #[test]
    fn loader_failures_carry_sprite_context() {
        let entries = vec![(SpriteKey::Weapon, PathBuf::from("missing.png"))];

        let error = SpriteSheet::from_entries(entries, &mut |_, _| bail!("no such file"))
            .expect_err("loader error propagates");

        assert!(format!("{error:#}").contains("failed to load sprite Weapon"));
    }

    #[test]
    fn sheet_exposes_loaded_sprites() {
        let entries = vec![(SpriteKey::Weapon, PathBuf::from("gun.png"))];
        let mut sheet = SpriteSheet::from_entries(entries, &mut |_, _| {
            Ok(Sprite::new(1, 1, vec![5]).expect("valid sprite"))
        })
        .expect("sheet loads");

        assert!(sheet.get(SpriteKey::Weapon).is_some());
        assert!(sheet.take(SpriteKey::Weapon).is_some());
        assert!(sheet.get(SpriteKey::Weapon).is_none());
    }

    #[test]
    fn decoding_maps_zero_alpha_to_transparent() {
        let bytes = png(2, 1, vec![10, 20, 30, 255, 99, 99, 99, 0]);

        let sprite = decode_sprite(&bytes).expect("valid png");

        assert_eq!((sprite.width(), sprite.height()), (2, 1));
        let opaque: Vec<_> = sprite.opaque_pixels().collect();
        assert_eq!(opaque, vec![(0, 0, 0xFF0A_141E)]);
    }

    #[test]
    fn decoding_rejects_garbage() {
        assert!(decode_sprite(b"not an image").is_err());
    }
}
