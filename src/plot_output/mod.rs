pub mod latex_plotter;
