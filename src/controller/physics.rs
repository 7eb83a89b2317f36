use glam::{Quat, Vec3};

/// Collision shape attached to a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Infinite plane through the body position, normal = orientation * +Z
    Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub usize);

#[derive(Debug, Clone)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub quaternion: Quat,
    pub angular_velocity: Vec3,
    /// 0 marks a static body
    pub mass: f32,
    pub shape: Shape,
}

impl RigidBody {
    pub fn new(shape: Shape, mass: f32, position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            quaternion: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            mass,
            shape,
        }
    }

    pub fn sphere(radius: f32, mass: f32, position: Vec3) -> Self {
        Self::new(Shape::Sphere { radius }, mass, position)
    }

    /// Static ground plane at y = 0 facing up
    pub fn ground() -> Self {
        let mut body = Self::new(Shape::Plane, 0.0, Vec3::ZERO);
        body.quaternion = Quat::from_axis_angle(Vec3::NEG_X, std::f32::consts::FRAC_PI_2);
        body
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    fn plane_normal(&self) -> Vec3 {
        (self.quaternion * Vec3::Z).normalize()
    }
}

/// Simulates rigid bodies under gravity with a fixed-step accumulator
pub struct PhysicsWorld {
    pub gravity: Vec3,
    pub friction: f32,
    pub restitution: f32,
    bodies: Vec<RigidBody>,
    accumulator: f32,
    last_sub_steps: u32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            friction: 0.4,
            restitution: 0.3,
            bodies: Vec::new(),
            accumulator: 0.0,
            last_sub_steps: 0,
        }
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        self.bodies.push(body);
        BodyId(self.bodies.len() - 1)
    }

    pub fn body(&self, id: BodyId) -> &RigidBody {
        &self.bodies[id.0]
    }

    pub fn body_mut(&mut self, id: BodyId) -> &mut RigidBody {
        &mut self.bodies[id.0]
    }

    /// Internal steps taken by the most recent `step` call
    pub fn last_sub_steps(&self) -> u32 {
        self.last_sub_steps
    }

    /// Advance by `real_delta` seconds in increments of `fixed_delta`, at most
    /// `max_sub_steps` of them. Time left over beyond the cap is dropped.
    pub fn step(&mut self, fixed_delta: f32, real_delta: f32, max_sub_steps: u32) {
        self.accumulator += real_delta.max(0.0);
        let mut sub_steps = 0;
        while self.accumulator >= fixed_delta && sub_steps < max_sub_steps {
            self.internal_step(fixed_delta);
            self.accumulator -= fixed_delta;
            sub_steps += 1;
        }
        if sub_steps == max_sub_steps && self.accumulator >= fixed_delta {
            tracing::trace!(dropped = self.accumulator, "physics sub-steps saturated");
        }
        self.accumulator %= fixed_delta;
        self.last_sub_steps = sub_steps;
    }

    fn internal_step(&mut self, dt: f32) {
        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            body.velocity += self.gravity * dt;
        }

        self.resolve_contacts(dt);

        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            body.position += body.velocity * dt;
            let spin = body.angular_velocity * dt;
            if spin.length_squared() > 0.0 {
                body.quaternion = (Quat::from_scaled_axis(spin) * body.quaternion).normalize();
            }
        }

        self.correct_penetration();
    }

    /// Sphere-vs-plane contacts: restitution along the normal, Coulomb friction
    /// along the tangent. Friction also spins the sphere.
    fn resolve_contacts(&mut self, dt: f32) {
        let planes: Vec<(Vec3, Vec3)> = self
            .bodies
            .iter()
            .filter(|b| b.shape == Shape::Plane)
            .map(|b| (b.position, b.plane_normal()))
            .collect();

        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            let Shape::Sphere { radius } = body.shape else { continue };
            for &(origin, normal) in &planes {
                let predicted = body.position + body.velocity * dt;
                let separation = (predicted - origin).dot(normal) - radius;
                if separation > 0.0 {
                    continue;
                }
                let vn = body.velocity.dot(normal);
                if vn >= 0.0 {
                    continue;
                }

                // Small approach speeds come to rest instead of bouncing forever
                let bounce = if -vn > self.gravity.length() * dt * 2.0 { self.restitution } else { 0.0 };
                let normal_impulse = -(1.0 + bounce) * vn * body.mass;
                body.velocity += normal * (normal_impulse / body.mass);

                let contact_velocity = body.velocity + body.angular_velocity.cross(-normal * radius);
                let tangent_velocity = contact_velocity - normal * contact_velocity.dot(normal);
                let tangent_speed = tangent_velocity.length();
                if tangent_speed > 1e-6 {
                    let tangent = tangent_velocity / tangent_speed;
                    let inertia = 0.4 * body.mass * radius * radius;
                    // Impulse that would stop sliding, capped by the friction cone
                    let effective_mass = 1.0 / (1.0 / body.mass + radius * radius / inertia);
                    let friction_impulse = (tangent_speed * effective_mass).min(self.friction * normal_impulse);
                    let impulse = -tangent * friction_impulse;
                    body.velocity += impulse / body.mass;
                    body.angular_velocity += (-normal * radius).cross(impulse) / inertia;
                }
            }
        }
    }

    fn correct_penetration(&mut self) {
        let planes: Vec<(Vec3, Vec3)> = self
            .bodies
            .iter()
            .filter(|b| b.shape == Shape::Plane)
            .map(|b| (b.position, b.plane_normal()))
            .collect();

        for body in self.bodies.iter_mut().filter(|b| !b.is_static()) {
            let Shape::Sphere { radius } = body.shape else { continue };
            for &(origin, normal) in &planes {
                let depth = radius - (body.position - origin).dot(normal);
                if depth > 0.0 {
                    body.position += normal * depth;
                }
            }
        }
    }
}
