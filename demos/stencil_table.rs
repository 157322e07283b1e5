//! Prints centered stencils for a few window sizes and derivative orders,
//! then exports one of them as CSV on stdout.

use central_stencil::{solve_stencil, write_stencil_csv, StencilConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cases = [(3, 1), (3, 2), (5, 1), (5, 2), (7, 3), (9, 4), (25, 2)];

    for (window_size, derivative) in cases {
        let stencil = solve_stencil(&StencilConfig::new(window_size, derivative)?)?;
        println!(
            "window={} derivative={} order={:?} cond={:.3e} confidence={:?}",
            window_size,
            derivative,
            stencil.accuracy_order(),
            stencil.condition_number(),
            stencil.confidence()
        );
        if window_size <= 9 {
            for (offset, weight) in stencil.iter() {
                println!("  [{:>3}] = {:>16.12}", offset, weight);
            }
        }
    }

    println!("\nCSV for the 5-point second derivative:");
    let stencil = solve_stencil(&StencilConfig::new(5, 2)?)?;
    write_stencil_csv(std::io::stdout().lock(), &stencil)?;

    Ok(())
}
