use std::sync::Mutex;
use std::time::{Duration, Instant};

use cancellation::CancellationToken;

use crate::camera::Camera;
use crate::color::Color;

pub const TILE_SIZE: usize = 32;

//
// Tiles
//

/// One work item for the queue: a half-open pixel range per axis,
/// `[x0, x1) x [y0, y1)` in image coordinates.
#[derive(Clone)]
pub struct RenderTile {
    pub id: usize,
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl RenderTile {
    pub fn pixel_count(&self) -> usize {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

/// Cuts the image into a grid of fixed-size tiles; edge tiles are clipped,
/// so every pixel lands in exactly one tile.
pub fn create_tiles(width: usize, height: usize, tile_size: usize) -> Vec<RenderTile> {
    let mut tiles = Vec::new();
    let mut id = 0;
    let mut y0 = 0;
    while y0 < height {
        let y1 = (y0 + tile_size).min(height);
        let mut x0 = 0;
        while x0 < width {
            let x1 = (x0 + tile_size).min(width);
            tiles.push(RenderTile { id, x0, x1, y0, y1 });
            id += 1;
            x0 = x1;
        }
        y0 = y1;
    }
    tiles
}

//
// Image sink
//

/// Write-only pixel surface the renderer populates. Implementations must
/// accept concurrent writes to distinct coordinates; the tile partition
/// guarantees no two workers ever touch the same coordinate.
pub trait ImageSink: Send + Sync {
    fn write_pixel(&self, x: usize, y: usize, color: Color);
}

/// An in-memory sink. Conversion to display bytes saturates each channel
/// to `[0, 255]`; pixel `(0, 0)` is the top-left corner.
pub struct ImageBuffer {
    width: usize,
    height: usize,
    pixels: Mutex<Vec<Color>>,
}

impl ImageBuffer {
    pub fn new(width: usize, height: usize) -> ImageBuffer {
        ImageBuffer {
            width,
            height,
            pixels: Mutex::new(vec![Color::BLACK; width * height]),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels.lock().unwrap()[y * self.width + x]
    }

    /// Row-major RGB bytes, clamped for persistence.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let pixels = self.pixels.lock().unwrap();
        let mut bytes = Vec::with_capacity(pixels.len() * 3);
        for color in pixels.iter() {
            bytes.extend_from_slice(&color.to_rgb8());
        }
        bytes
    }
}

impl ImageSink for ImageBuffer {
    fn write_pixel(&self, x: usize, y: usize, color: Color) {
        self.pixels.lock().unwrap()[y * self.width + x] = color;
    }
}

//
// Render driver
//

#[derive(Debug, Clone)]
pub struct RenderStats {
    pub tiles_total: usize,
    pub tiles_completed: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
}

// A message from a worker thread back to the coordinating thread
enum WorkerMessage {
    TileCompleted {
        worker: usize,
        tile: usize,
        duration: Duration,
    },
}

pub(crate) fn render(camera: &Camera, sink: &dyn ImageSink, token: &CancellationToken) -> RenderStats {
    let (nx, ny) = camera.resolution();
    let tiles = create_tiles(nx, ny, TILE_SIZE);
    let tiles_total = tiles.len();
    let threads = camera.threads();
    let started = Instant::now();

    log::info!(
        "rendering {}x{} ({} tiles) on {}",
        nx,
        ny,
        tiles_total,
        if threads == 0 { "the calling thread".to_string() } else { format!("{threads} worker threads") },
    );

    let tiles_completed = if threads == 0 {
        render_inline(camera, sink, token, &tiles)
    } else {
        render_parallel(camera, sink, token, tiles, threads)
    };

    let stats = RenderStats {
        tiles_total,
        tiles_completed,
        cancelled: tiles_completed < tiles_total,
        elapsed: started.elapsed(),
    };
    log::info!(
        "rendered {}/{} tiles in {:.3}s{}",
        stats.tiles_completed,
        stats.tiles_total,
        stats.elapsed.as_secs_f64(),
        if stats.cancelled { " (cancelled)" } else { "" },
    );
    stats
}

fn render_tile(camera: &Camera, tile: &RenderTile, sink: &dyn ImageSink) {
    for y in tile.y0..tile.y1 {
        for x in tile.x0..tile.x1 {
            sink.write_pixel(x, y, camera.pixel_color(x, y));
        }
    }
}

fn render_inline(
    camera: &Camera,
    sink: &dyn ImageSink,
    token: &CancellationToken,
    tiles: &[RenderTile],
) -> usize {
    let mut completed = 0;
    for tile in tiles {
        if token.is_canceled() {
            break;
        }
        render_tile(camera, tile, sink);
        completed += 1;
    }
    completed
}

fn render_parallel(
    camera: &Camera,
    sink: &dyn ImageSink,
    token: &CancellationToken,
    tiles: Vec<RenderTile>,
    threads: usize,
) -> usize {
    let (work_sender, work_receiver) = flume::unbounded();
    for tile in tiles {
        work_sender.send(tile).expect("failed to queue render tile");
    }
    // Drop the sender so workers drain the queue and stop
    drop(work_sender);

    let (message_sender, message_receiver) = flume::unbounded();

    std::thread::scope(|scope| {
        for id in 0..threads {
            let work_receiver = work_receiver.clone();
            let message_sender = message_sender.clone();
            std::thread::Builder::new()
                .name(format!("render-worker-{id}"))
                .spawn_scoped(scope, move || {
                    for tile in work_receiver.iter() {
                        // Cancellation is polled at tile boundaries only;
                        // an in-flight tile always completes
                        if token.is_canceled() {
                            return;
                        }
                        let tile_started = Instant::now();
                        let tile_id = tile.id;
                        render_tile(camera, &tile, sink);
                        message_sender
                            .send(WorkerMessage::TileCompleted {
                                worker: id,
                                tile: tile_id,
                                duration: tile_started.elapsed(),
                            })
                            .ok();
                    }
                })
                .expect("failed to spawn render thread");
        }
        drop(message_sender);

        let mut completed = 0;
        let mut per_worker = vec![0usize; threads];
        for message in message_receiver.iter() {
            let WorkerMessage::TileCompleted { worker, tile, duration } = message;
            completed += 1;
            per_worker[worker] += 1;
            log::debug!(
                "worker {} finished tile {} in {:.1}ms",
                worker,
                tile,
                duration.as_secs_f64() * 1000.0,
            );
        }
        log::info!("tiles per worker: {:?}", per_worker);
        completed
    })
}
