use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// PID Controller (three axes, shared gains)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Per-axis bound on the integral term (anti-windup).
    pub integral_limit: f64,
    integral: Vector3<f64>,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd, integral_limit: 1.0, integral: Vector3::zeros() }
    }

    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit;
        self
    }

    /// `error_rate` is the time derivative of `error`, usually a measured
    /// rate rather than a difference of successive errors.
    pub fn update(&mut self, error: &Vector3<f64>, error_rate: &Vector3<f64>, dt: f64) -> Vector3<f64> {
        self.integral += error * dt;
        let limit = self.integral_limit;
        self.integral.apply(|c| *c = c.clamp(-limit, limit));
        error * self.kp + self.integral * self.ki + error_rate * self.kd
    }

    pub fn integral(&self) -> &Vector3<f64> {
        &self.integral
    }

    pub fn reset(&mut self) {
        self.integral = Vector3::zeros();
    }
}
