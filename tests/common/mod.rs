use d4disp::{DampingParams, Structure, default_functionals};

/// TPSSh damping parameters from the embedded table.
pub fn tpssh() -> DampingParams {
    default_functionals().resolve("tpssh").unwrap()
}

/// A 12-atom thiazole-like heteroaromatic ring (C5H5NS), coordinates in
/// Bohr.
pub fn thiazole_like() -> Structure {
    Structure::new(
        vec![6, 6, 6, 6, 7, 6, 16, 1, 1, 1, 1, 1],
        vec![
            [-2.56745685, -0.02509985, 0.0],
            [-1.39177582, 2.27696188, 0.0],
            [1.27784995, 2.45107479, 0.0],
            [2.62801937, 0.25927727, 0.0],
            [1.41097033, -1.99890996, 0.0],
            [-1.17186102, -2.34220576, 0.0],
            [-2.39505990, -5.22635838, 0.0],
            [2.41961980, -3.62158019, 0.0],
            [-4.60349769, -0.42778650, 0.0],
            [-2.51012563, 3.93425043, 0.0],
            [2.24393390, 4.30268185, 0.0],
            [4.66757904, 0.18907709, 0.0],
        ],
    )
}

/// A single water molecule, coordinates in Bohr.
pub fn water() -> Structure {
    Structure::new(
        vec![8, 1, 1],
        vec![
            [0.0, 0.0, 0.22260],
            [0.0, 1.43047, -0.89040],
            [0.0, -1.43047, -0.89040],
        ],
    )
}

/// Two water molecules at hydrogen-bonding distance, coordinates in Bohr.
pub fn water_dimer() -> Structure {
    let shift = 5.5;
    Structure::new(
        vec![8, 1, 1, 8, 1, 1],
        vec![
            [0.0, 0.0, 0.22260],
            [0.0, 1.43047, -0.89040],
            [0.0, -1.43047, -0.89040],
            [shift, 0.0, 0.22260],
            [shift, 1.43047, -0.89040],
            [shift, -1.43047, -0.89040],
        ],
    )
}
