fn main() {
   match glstate::main() {
      Ok(()) => (),
      Err(payload) => {
         log::error!("main() returned with an Err:\n{:?}", payload);
         eprintln!("An error occured:\n{:?}", payload);
         std::process::exit(1);
      }
   }
}
