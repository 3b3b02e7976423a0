/// Fallback values for everything a setup file may omit.
pub struct DefaultsConfig {
    pub tapsim_bin: String,
    pub meshgen_bin: String,
    pub lammps_bin: String,
    pub potentials: String,
    pub total_events: String,
    pub events_per_step: String,
    pub coordination_cutoff: f64,
    pub bulk_coordination: u32,
    pub surface_only: bool,
    pub etol: f64,
    pub ftol: f64,
    pub maxiter: usize,
    pub maxeval: usize,
    pub temperature: f64,
    pub cleanup: bool,
    pub element: DefaultElement,
}

pub struct DefaultElement {
    pub label: String,
    pub mass: f64,
    pub charge: i32,
    pub e_fields: Vec<f64>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            tapsim_bin: "~/bin/tapsim".to_string(),
            meshgen_bin: "~/bin/meshgen".to_string(),
            lammps_bin: "~/bin/lmp".to_string(),
            potentials: "~/software/lammps/potentials/library.meam".to_string(),
            total_events: "100%".to_string(),
            events_per_step: "10%".to_string(),
            coordination_cutoff: 3.0,
            bulk_coordination: 8,
            surface_only: true,
            etol: 1e-8,
            ftol: 1e-8,
            maxiter: 1000,
            maxeval: 1000,
            temperature: 50.0,
            cleanup: false,
            element: DefaultElement {
                label: "W".to_string(),
                mass: 183.85,
                charge: 3,
                e_fields: vec![
                    57e-9, 27e-9, 37e-9, 47e-9, 57e-9, 67e-9, 77e-9, 87e-9, 97e-9, 107e-9,
                ],
            },
        }
    }
}
