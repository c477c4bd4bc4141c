/// Terminal frontend for the pivot3d rendering pipeline
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal,
};
use nalgebra::{Point3, Vector3};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

use pivot3d_core::{
    Angle, Arrow, Axis, Camera, Canvas, Color, Pivot, RenderQueue, Scene, Shape,
};

pub mod renderer;

pub use renderer::TermCanvas;

/// Scene parameters for the demo.
pub struct AppConfig {
    pub cube_size: f64,
    pub distance: f64,
    pub fps: u64,
    pub show_normals: bool,
}

/// Main application struct for the terminal demo: a spinning, bouncing
/// cube and a square orbiting an external pivot, drawn back-to-front
/// through the core pipeline.
pub struct TerminalApp {
    scene: Scene,
    camera: Camera,
    cube: Shape,
    square: Shape,
    canvas: TermCanvas,
    cube_velocity: Vector3<f64>,
    distance: f64,
    show_normals: bool,
    target_frame_time: Duration,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: AppConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let mut scene = Scene::new();
        let camera = Camera::new(
            &mut scene,
            width as u32,
            height as u32,
            Angle::from_degrees(45.0),
            Angle::from_degrees(45.0),
        );

        let mut cube = Shape::cube(
            &mut scene,
            Point3::new(0.0, 0.0, config.distance),
            config.cube_size,
        )
        .map_err(io::Error::other)?;
        cube.set_color(Color::BLUE);

        let mut square = Shape::square(
            &mut scene,
            Point3::new(config.cube_size * 0.75, config.cube_size * 0.75, config.distance),
            config.cube_size,
        )
        .map_err(io::Error::other)?;
        square.set_color(Color::RED);

        Ok(Self {
            scene,
            camera,
            cube,
            square,
            canvas: TermCanvas::new(width as u32, height as u32),
            cube_velocity: Vector3::new(10.0, 9.0, 8.0),
            distance: config.distance,
            show_normals: config.show_normals,
            target_frame_time: Duration::from_millis(1000 / config.fps.max(1)),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            // Update
            self.update();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let walk = Vector3::new(10.0, 0.0, 0.0);
        let forward = Vector3::new(0.0, 0.0, 10.0);
        if let Event::Key(KeyEvent { code, .. }) = event::read()? {
            match code {
                KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('d') => {
                    self.scene.translate(self.camera.position, walk);
                }
                KeyCode::Char('a') => {
                    self.scene.translate(self.camera.position, -walk);
                }
                KeyCode::Char('w') => {
                    self.scene.translate(self.camera.position, forward);
                }
                KeyCode::Char('s') => {
                    self.scene.translate(self.camera.position, -forward);
                }
                // Yaw only updates the camera's stored rotation until
                // camera space applies it.
                KeyCode::Char('q') => {
                    self.scene.rotate(
                        self.camera.rotation,
                        Axis::Y,
                        Angle::from_degrees(5.0),
                        Pivot::Local,
                    );
                }
                KeyCode::Char('e') => {
                    self.scene.rotate(
                        self.camera.rotation,
                        Axis::Y,
                        Angle::from_degrees(-5.0),
                        Pivot::Local,
                    );
                }
                KeyCode::Char('n') => {
                    self.show_normals = !self.show_normals;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn update(&mut self) {
        // Spin the cube in place.
        self.scene.rotate(
            self.cube.rotation,
            Axis::Y,
            Angle::from_degrees(5.0),
            Pivot::Local,
        );
        self.scene.rotate(
            self.cube.rotation,
            Axis::Z,
            Angle::from_degrees(3.0),
            Pivot::Local,
        );

        // Orbit the square around a pivot hanging in front of it.
        let square_center = self.scene.coords(self.square.position);
        let pivot = Point3::new(square_center.x, square_center.y, self.distance - 50.0);
        self.scene.rotate(
            self.square.rotation,
            Axis::X,
            Angle::from_degrees(10.0),
            Pivot::At(pivot),
        );

        self.bounce_cube();
        self.shade_faces();
    }

    /// Reflects the cube's velocity off the viewport half extents and a
    /// near/far band around the base distance.
    fn bounce_cube(&mut self) {
        let (hx, hy) = self.camera.frustum.half_extents();
        let pos = self.scene.coords(self.cube.position);
        let v = &mut self.cube_velocity;
        if (v.x > 0.0 && pos.x >= hx) || (v.x < 0.0 && pos.x <= -hx) {
            v.x = -v.x;
        }
        if (v.y > 0.0 && pos.y >= hy) || (v.y < 0.0 && pos.y <= -hy) {
            v.y = -v.y;
        }
        if (v.z > 0.0 && pos.z >= self.distance + 150.0)
            || (v.z < 0.0 && pos.z <= self.distance - 150.0)
        {
            v.z = -v.z;
        }
        self.scene.translate(self.cube.position, self.cube_velocity);
    }

    /// Applies the external shading factor: how parallel each face
    /// normal is to a fixed light direction, with an ambient floor.
    fn shade_faces(&mut self) {
        let light = Vector3::new(1.0, 2.0, -2.0).normalize();
        for poly in self.cube.polys_mut() {
            let n = poly.normal(&self.scene);
            let factor = 0.25 + 0.75 * n.dot(&light).max(0.0);
            poly.set_color(Color::BLUE.shaded(factor));
        }
        let up = Vector3::new(0.0, 1.0, 0.0);
        for poly in self.square.polys_mut() {
            let factor = 0.25 + 0.75 * poly.normal(&self.scene).dot(&up).abs();
            poly.set_color(Color::RED.shaded(factor));
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.canvas.clear();

        // Normal arrows are rebuilt from the current geometry each frame.
        let mut arrows = Vec::new();
        if self.show_normals {
            for poly in self.cube.polys().iter().chain(self.square.polys()) {
                let mut arrow = Arrow::from_normal(&self.scene, poly, 40.0);
                arrow.set_color(Color::GREEN);
                arrows.push(arrow);
            }
        }

        let mut render_queue = RenderQueue::new();
        render_queue.add_stageable(&self.square);
        render_queue.add_stageable(&self.cube);
        for arrow in &arrows {
            render_queue.add_stageable(arrow);
        }
        render_queue.stage();
        render_queue.render(&self.scene, &self.camera, &mut self.canvas);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.canvas.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(TermColor::Yellow),
            Print(format!(
                "Pivot3D Terminal | FPS: {:.1} | WASD=Move Q/E=Yaw N=Normals ESC=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
