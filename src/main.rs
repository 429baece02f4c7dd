use ndarray::Array1;

use thermocal_backend::*;

fn main() {
    let cal = Calibrator::new();
    let r = Array1::linspace(45.0, 10000.0, 10000);

    let mut timer = TickTimer::new();
    let t_fast = BaseCalibrator::convert_arr(&cal, "Dipstick", r.view(), 1.0);
    let dt_fast = timer.tick_print("vectorized dipstick pass [ms]");

    let t_slow: Vec<f64> = r.iter().map(|&ri| cal.convert("Dipstick", ri, 1.0)).collect();
    let dt_slow = timer.tick_print("per-sample dipstick pass [ms]");
    println!("speedup: {:.1}x", dt_slow / dt_fast.max(1e-9));

    let i_1k = r.iter().position(|&ri| ri >= 1000.0).unwrap();
    println!(
        "T(1000 ohm) = {:.3} K (fast {:.3} K)",
        t_slow[i_1k], t_fast[i_1k]
    );
    for (name, res) in [("Morso", 100.0), ("Ling", 5000.0), ("Kanada", 500.0)] {
        let out = cal.convert_flagged(name, res, 1.0);
        println!(
            "{}: T({} ohm) = {:.3} K, in range: {}",
            name, res, out.0, out.1
        );
    }
}
