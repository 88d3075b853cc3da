use colored::Colorize as _;

mod surface;

use crate::surface::Surface;

macro_rules! tests {
  ($($name:expr, $module:ident),*) => {
    // declare the modules for all tests
    $(
      mod $module;
    )*

    // list of all available integration tests
    const TEST_NAMES: &[&str] = &[$( $name ),*];

    // run a given test; None if the name is unknown
    fn run_test(name: &str, surface: &mut Surface) -> Option<Result<(), lustre::Error>> {
      $(
        if name == $name {
          return Some($module::fixture(&mut surface.ctx));
        }
      )*

      None
    }
  }
}

tests! {
  "buffer-upload", buffer_upload,
  "object-lifecycle", object_lifecycle,
  "state-roundtrip", state_roundtrip,
  "texture-mipmaps", texture_mipmaps,
  "program-uniforms", program_uniforms,
  "fence-and-timestamp", fence_and_timestamp,
  "gl33-f64-uniform", f64_uniform
}

fn list_tests() {
  for test_name in TEST_NAMES {
    println!("  -> {}", test_name.blue());
  }
}

fn main() {
  env_logger::init();

  let test_name = match std::env::args().nth(1) {
    Some(test_name) => test_name,
    None => {
      println!("Please provide a test name. Possible values");
      list_tests();
      return;
    }
  };

  println!("test name: {}", test_name.green());

  let mut surface = match Surface::new(&test_name) {
    Ok(surface) => surface,
    Err(e) => {
      println!("{}: {}", "cannot create a context".red(), e);
      std::process::exit(2);
    }
  };

  match run_test(&test_name, &mut surface) {
    Some(Ok(())) => println!("{}", "ok".green()),
    Some(Err(e)) => {
      println!("{}: {}", "failed".red(), e);
      std::process::exit(1);
    }
    None => {
      println!("{} is not a valid test. Possible values", test_name.red());
      list_tests();
      std::process::exit(2);
    }
  }
}
