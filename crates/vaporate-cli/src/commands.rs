pub mod from_lammps;
pub mod reduce;
pub mod run;
pub mod to_lammps;
